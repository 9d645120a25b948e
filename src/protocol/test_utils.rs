//! Property-based round-trip testing helpers for codec types.

/// Generates a `proptest` that checks `read(write(x)) == x` for an
/// `Arbitrary` type implementing [`ReadType`](super::traits::ReadType) and
/// [`WriteType`](super::traits::WriteType).
macro_rules! test_roundtrip {
    ($t:ty, $name:ident) => {
        mod $name {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                #[test]
                fn roundtrip(orig: $t) {
                    let mut buf = Vec::new();
                    orig.write(&mut buf).unwrap();

                    let mut cursor = std::io::Cursor::new(buf);
                    let restored = <$t as $crate::protocol::traits::ReadType<_>>::read(&mut cursor).unwrap();
                    prop_assert_eq!(orig, restored);
                }
            }
        }
    };
}

pub(crate) use test_roundtrip;
