use std::sync::Arc;

use huffpack::{
    BitArray, BitSink, BitSource, BitStreamReader, BitStreamWriter, CharacterCodec, Codec,
    CodecConfig, Collector, HuffpackError, ListCodec, StringCodec,
};

fn list_codec() -> ListCodec {
    let config = CodecConfig::default();
    let chars = Arc::new(CharacterCodec::train(["red", "green", "blue"], &config).unwrap());
    let strings =
        StringCodec::from_frequencies([("red", 5u64), ("green", 3), ("blue", 1)], chars, &config)
            .unwrap();
    ListCodec::new(Arc::new(strings))
}

#[test]
fn stream_bytes_match_array_bytes() {
    let codec = list_codec();
    let items = ["red", "blue", "teal", "green", "red"];

    let mut writer = BitStreamWriter::new(Vec::new());
    for item in items {
        codec.string_codec().encode_str(item, &mut writer).unwrap();
    }
    let bits = writer.bits_written();
    writer.pad_to_byte().unwrap();
    let bytes = writer.close().unwrap();

    let array = codec.encode_list(items).unwrap();
    assert_eq!(bits, array.len_bits());
    assert_eq!(bytes, array.into_bytes());
}

#[test]
fn string_codec_decodes_from_reader() {
    let codec = list_codec();
    let items = ["green", "purple", "red"];
    let bytes = codec.encode_list(items).unwrap().into_bytes();

    let mut reader = BitStreamReader::new(&bytes[..]);
    let mut collector = Collector::with_limit(items.len());
    let n = codec
        .string_codec()
        .decode(&mut reader, &mut collector)
        .unwrap();
    assert_eq!(n, 3);
    assert_eq!(collector.into_items(), items);
}

#[test]
fn list_decode_needs_a_seekable_source() {
    let codec = list_codec();
    let bytes = codec.encode_list(["red"]).unwrap().into_bytes();
    let mut reader = BitStreamReader::new(&bytes[..]);
    let err = codec
        .decode(&mut reader, &mut Collector::<String>::unbounded())
        .unwrap_err();
    assert!(matches!(err, HuffpackError::Unseekable));
}

#[test]
fn closing_with_pending_bits_fails() {
    let mut writer = BitStreamWriter::new(Vec::new());
    writer.write_bits(0b101, 3).unwrap();
    assert_eq!(writer.pending_bits(), 3);
    let err = writer.close().unwrap_err();
    assert!(matches!(err, HuffpackError::UnflushedBits { pending: 3 }));
}

#[test]
fn padding_reports_its_width() {
    let mut writer = BitStreamWriter::new(Vec::new());
    writer.write_bits(0b1, 1).unwrap();
    writer.write_bits(0xABCD, 16).unwrap();
    assert_eq!(writer.pad_to_byte().unwrap(), 7);
    assert_eq!(writer.pad_to_byte().unwrap(), 0);
    assert_eq!(writer.close().unwrap(), vec![0b1101_0101, 0b1110_0110, 0b1000_0000]);
}

#[test]
fn reader_runs_out_cleanly() {
    let data = [0xF0u8];
    let mut reader = BitStreamReader::new(&data[..]);
    assert_eq!(reader.read_bits(4).unwrap(), 0xF);
    assert!(!reader.is_exhausted().unwrap());
    let err = reader.read_bits(8).unwrap_err();
    assert!(matches!(err, HuffpackError::OutOfBits { requested: 8, .. }));
}

#[test]
fn wide_reads_cross_bytes() {
    let mut array = BitArray::new();
    array.write_bits(u64::MAX - 1, 64).unwrap();
    array.write_bits(0b10, 2).unwrap();
    let bytes = array.into_bytes();

    let mut reader = BitStreamReader::new(&bytes[..]);
    assert_eq!(reader.read_bits(64).unwrap(), u64::MAX - 1);
    assert_eq!(reader.read_bits(2).unwrap(), 0b10);
    assert_eq!(reader.position(), 66);
}
