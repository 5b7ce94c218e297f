use std::sync::Arc;

use honggfuzz::fuzz;
use huffpack::{BitArray, CharacterCodec, CodecConfig, ListCodec, StringCodec};

fn main() {
    let config = CodecConfig::default().with_maximum_length(8);
    let chars = Arc::new(
        CharacterCodec::train(["fuzz", "target", "decoder"], &config).expect("train chars"),
    );
    let strings = StringCodec::from_frequencies(
        [("fuzz", 8u64), ("target", 4), ("decoder", 2)],
        chars,
        &config,
    )
    .expect("train strings");
    let codec = ListCodec::new(Arc::new(strings));

    loop {
        fuzz!(|data: &[u8]| {
            let mut bits = BitArray::from_bytes(data.to_vec());
            if let Ok(items) = codec.decode_list(&mut bits, 64) {
                let mut again = codec.encode_list(&items).expect("re-encode");
                assert_eq!(codec.decode_list(&mut again, items.len()).ok(), Some(items));
            }
        });
    }
}
