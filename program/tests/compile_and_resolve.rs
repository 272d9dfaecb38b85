use vault_message::{
    account::AccountMeta,
    address_lookup_table::AddressLookupTableAccount,
    instruction::Instruction,
    pda::{get_ephemeral_signer_pdas, get_transaction_pda, get_vault_pda},
    pubkey::Pubkey,
    resolve::resolve_account_metas,
    CompileError, VaultTransactionMessage,
};

fn compile_bytes(
    vault: &Pubkey,
    instructions: &[Instruction],
    tables: &[AddressLookupTableAccount],
) -> Vec<u8> {
    VaultTransactionMessage::try_compile(vault, instructions, tables)
        .unwrap()
        .serialize()
        .unwrap()
}

// One transfer-like instruction: V signs and pays, D receives.
#[test]
fn test_single_instruction_scenario() {
    let vault = Pubkey::new_unique();
    let destination = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let ix = Instruction::new(
        program,
        vec![1, 2, 3],
        vec![
            AccountMeta::new(vault, true),
            AccountMeta::new(destination, false),
        ],
    );

    let bytes = compile_bytes(&vault, &[ix.clone()], &[]);
    let message = VaultTransactionMessage::deserialize(&bytes).unwrap();

    assert_eq!(message.num_signers, 1);
    assert_eq!(message.num_writable_signers, 1);
    assert_eq!(message.num_writable_non_signers, 1);
    assert_eq!(*message.account_keys, vec![vault, destination, program]);
    assert_eq!(message.instructions[0].program_id_index, 2);
    assert_eq!(*message.instructions[0].account_indexes, vec![0, 1]);
    assert_eq!(*message.instructions[0].data, vec![1, 2, 3]);

    // same instructions, destination now sits at index 5 of a table
    let mut addresses: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
    addresses.push(destination);
    let table = AddressLookupTableAccount::new(Pubkey::new_unique(), addresses);

    let bytes = compile_bytes(&vault, &[ix], &[table.clone()]);
    let message = VaultTransactionMessage::deserialize(&bytes).unwrap();

    assert_eq!(*message.account_keys, vec![vault, program]);
    assert_eq!(message.address_table_lookups[0].account_key, table.key);
    assert_eq!(*message.address_table_lookups[0].writable_indexes, vec![5]);
    assert!(message.address_table_lookups[0].readonly_indexes.is_empty());
}

#[test]
fn test_compile_is_deterministic() {
    let vault = Pubkey::new_unique();
    let keys: Vec<Pubkey> = (0..12).map(|_| Pubkey::new_unique()).collect();
    let programs = [Pubkey::new_unique(), Pubkey::new_unique()];
    let instructions = vec![
        Instruction::new(
            programs[0],
            vec![0; 40],
            keys[..6]
                .iter()
                .enumerate()
                .map(|(i, key)| AccountMeta {
                    pubkey: *key,
                    is_signer: i % 3 == 0,
                    is_writable: i % 2 == 0,
                })
                .collect(),
        ),
        Instruction::new(
            programs[1],
            vec![7; 3],
            keys[4..]
                .iter()
                .rev()
                .map(|key| AccountMeta::new_readonly(*key, false))
                .collect(),
        ),
    ];
    let tables = vec![
        AddressLookupTableAccount::new(Pubkey::new_unique(), keys[8..].to_vec()),
        AddressLookupTableAccount::new(Pubkey::new_unique(), keys[..10].to_vec()),
    ];

    let first = compile_bytes(&vault, &instructions, &tables);
    let second = compile_bytes(&vault, &instructions, &tables);
    assert_eq!(first, second);

    let decoded = VaultTransactionMessage::deserialize(&first).unwrap();
    assert_eq!(decoded.account_keys[0], vault);
    assert_eq!(decoded.serialize().unwrap(), first);
}

#[test]
fn test_vault_is_first_even_when_referenced_late() {
    let vault = Pubkey::new_unique();
    let signer = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let ix = Instruction::new(
        program,
        vec![],
        vec![
            AccountMeta::new(signer, true),
            AccountMeta::new_readonly(vault, false),
        ],
    );

    let message =
        VaultTransactionMessage::deserialize(&compile_bytes(&vault, &[ix], &[])).unwrap();
    assert_eq!(*message.account_keys, vec![vault, signer, program]);
    assert_eq!(message.num_writable_signers, 2);
}

#[test]
fn test_signer_flag_is_monotonic() {
    let vault = Pubkey::new_unique();
    let shared = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let instructions = [
        Instruction::new(program, vec![], vec![AccountMeta::new_readonly(shared, false)]),
        Instruction::new(program, vec![], vec![AccountMeta::new_readonly(shared, true)]),
        Instruction::new(program, vec![], vec![AccountMeta::new_readonly(shared, false)]),
    ];

    let message = VaultTransactionMessage::try_compile(&vault, &instructions, &[]).unwrap();
    let position = message
        .account_keys
        .iter()
        .position(|key| *key == shared)
        .unwrap();
    assert!(message.is_signer_index(position));
    assert!(!message.is_static_writable_index(position));
}

#[test]
fn test_capacity_boundary() {
    let vault = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let accounts = |count: usize| -> Vec<AccountMeta> {
        (0..count)
            .map(|_| AccountMeta::new_readonly(Pubkey::new_unique(), false))
            .collect()
    };

    // vault + program + 254 accounts = 256 keys
    let at_limit = Instruction::new(program, vec![], accounts(254));
    let message = VaultTransactionMessage::try_compile(&vault, &[at_limit], &[]).unwrap();
    assert_eq!(message.account_keys.len(), 256);

    let over_limit = Instruction::new(program, vec![], accounts(255));
    assert_eq!(
        VaultTransactionMessage::try_compile(&vault, &[over_limit], &[]),
        Err(CompileError::TooManyKeys)
    );
}

#[test]
fn test_first_table_claims_shared_keys() {
    let vault = Pubkey::new_unique();
    let program = Pubkey::new_unique();
    let shared = Pubkey::new_unique();
    let only_second = Pubkey::new_unique();
    let first = AddressLookupTableAccount::new(Pubkey::new_unique(), vec![shared]);
    let second =
        AddressLookupTableAccount::new(Pubkey::new_unique(), vec![only_second, shared]);
    let ix = Instruction::new(
        program,
        vec![],
        vec![
            AccountMeta::new(shared, false),
            AccountMeta::new(only_second, false),
        ],
    );

    let message = VaultTransactionMessage::try_compile(
        &vault,
        &[ix.clone()],
        &[first.clone(), second.clone()],
    )
    .unwrap();
    assert_eq!(*message.account_keys, vec![vault, program]);
    assert_eq!(message.address_table_lookups.len(), 2);
    assert_eq!(message.address_table_lookups[0].account_key, first.key);
    assert_eq!(*message.address_table_lookups[0].writable_indexes, vec![0]);
    assert_eq!(message.address_table_lookups[1].account_key, second.key);
    assert_eq!(*message.address_table_lookups[1].writable_indexes, vec![0]);

    // swapping the tables hands both keys to the second table
    let message =
        VaultTransactionMessage::try_compile(&vault, &[ix], &[second.clone(), first]).unwrap();
    assert_eq!(message.address_table_lookups.len(), 1);
    assert_eq!(message.address_table_lookups[0].account_key, second.key);
    assert_eq!(*message.address_table_lookups[0].writable_indexes, vec![1, 0]);
}

#[test]
fn test_resolve_never_marks_pdas_as_signers() {
    let program_id = Pubkey::new_unique();
    let multisig = Pubkey::new_unique();
    let (vault, _) = get_vault_pda(&multisig, 0, &program_id).unwrap();
    let (transaction, _) = get_transaction_pda(&multisig, 7, &program_id).unwrap();
    let ephemeral_signers = get_ephemeral_signer_pdas(&transaction, 2, &program_id).unwrap();
    let target = Pubkey::new_unique();
    let table_account = Pubkey::new_unique();
    let table = AddressLookupTableAccount::new(Pubkey::new_unique(), vec![table_account]);

    let ix = Instruction::new(
        Pubkey::new_unique(),
        vec![0],
        vec![
            AccountMeta::new(vault, true),
            AccountMeta::new(ephemeral_signers[0], true),
            AccountMeta::new_readonly(ephemeral_signers[1], true),
            AccountMeta::new(target, false),
            AccountMeta::new_readonly(table_account, false),
        ],
    );
    let bytes = compile_bytes(&vault, &[ix], &[table.clone()]);
    let message = VaultTransactionMessage::deserialize(&bytes).unwrap();
    assert_eq!(message.num_signers, 3);

    let resolved =
        resolve_account_metas(&message, &vault, &ephemeral_signers, &[table.clone()]).unwrap();
    assert!(resolved.account_metas.iter().all(|meta| !meta.is_signer));
    assert_eq!(resolved.account_metas[0], AccountMeta::new_readonly(table.key, false));
    assert_eq!(resolved.account_metas[1], AccountMeta::new(vault, false));
    assert_eq!(
        resolved.account_metas.last(),
        Some(&AccountMeta::new_readonly(table_account, false))
    );
    assert_eq!(resolved.account_metas.len(), 1 + message.num_all_account_keys());
}
