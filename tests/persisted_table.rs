use std::fs;
use std::sync::Arc;

use huffpack::codebook::{load_bincode, save_bincode};
use huffpack::{
    CharacterCodec, CodecConfig, Codebook, HuffmanCodeTable, HuffpackError, ListCodec,
    PersistedCodeTable, StringCodec, StringPool, SymbolTable,
};

fn sample_codec() -> ListCodec {
    let samples = ["north", "south", "north", "east", "north", "west", "south"];
    let config = CodecConfig::default().with_maximum_length(12);
    let chars = Arc::new(CharacterCodec::train(samples, &config).unwrap());
    let strings = StringCodec::train(samples, &mut StringPool::new(), chars, &config).unwrap();
    ListCodec::new(Arc::new(strings))
}

#[test]
fn codebook_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.bin");
    let codec = sample_codec();
    Codebook::from_list_codec(&codec).save(&path).unwrap();

    let restored = Codebook::load(&path).unwrap().to_list_codec().unwrap();
    let items = ["west", "north", "north-east", ""];
    let mut bits = codec.encode_list(items).unwrap();
    assert_eq!(restored.decode_list(&mut bits, items.len()).unwrap(), items);
    assert_eq!(
        restored.encode_list(items).unwrap(),
        codec.encode_list(items).unwrap()
    );
}

#[test]
fn generic_table_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("table.bin");
    let symbols =
        SymbolTable::build([(10u16, 40u64), (20, 30), (30, 20), (40, 10)], None, 1).unwrap();
    let table = HuffmanCodeTable::build(&symbols, 16).unwrap();

    save_bincode(&PersistedCodeTable::from_table(&table), &path).unwrap();
    let loaded: PersistedCodeTable<u16> = load_bincode(&path).unwrap();
    let rebuilt = loaded.to_table().unwrap();
    assert_eq!(
        table.iter().collect::<Vec<_>>(),
        rebuilt.iter().collect::<Vec<_>>()
    );
}

#[test]
fn corrupt_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.bin");
    fs::write(&path, [0xFFu8; 5]).unwrap();
    assert!(matches!(
        Codebook::load(&path),
        Err(HuffpackError::Bincode(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Codebook::load(dir.path().join("absent.bin")),
        Err(HuffpackError::Io(_))
    ));
}

#[test]
fn oversubscribed_lengths_are_rejected() {
    let persisted = PersistedCodeTable {
        entries: vec![('a', 1u8), ('b', 1), ('c', 1)],
        escape: None,
    };
    assert!(matches!(
        persisted.to_table(),
        Err(HuffpackError::InvalidCodeTable(_))
    ));
}

#[test]
fn tampered_escape_is_rejected() {
    let mut book = Codebook::from_list_codec(&sample_codec());
    book.strings.escape = None;
    assert!(matches!(
        book.to_list_codec(),
        Err(HuffpackError::InvalidCodeTable(_))
    ));
}
