//! Closed name vocabularies.
//!
//! HTML element/attribute names and CSS property names are resolved once,
//! when the tokenizer has seen the whole name, into a dense enum index. Filter
//! tables are then plain arrays indexed by that enum.

/// Longest text in a name table, usable in const context.
pub const fn max_len(texts: &[&str]) -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < texts.len() {
        if texts[i].len() > max {
            max = texts[i].len();
        }
        i += 1;
    }
    max
}

/// Scratch size for case folding during lookup.
pub const LOOKUP_BUFFER: usize = 32;

/// Declare a name enum with an `Unknown` variant at index zero.
///
/// Texts must be lowercase. Lookup folds ASCII case and rejects anything
/// longer than the longest known name without scanning.
#[macro_export]
macro_rules! define_names {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        $vis enum $name {
            Unknown,
            $($variant,)*
        }

        impl $name {
            /// Every known name, `Unknown` excluded, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];
            pub const COUNT: usize = Self::ALL.len() + 1;
            const TEXTS: &'static [&'static str] = &["", $($text,)*];
            pub const MAX_LEN: usize = $crate::names::max_len(Self::TEXTS);

            pub fn index(self) -> usize {
                self as usize
            }

            pub fn as_str(self) -> &'static str {
                Self::TEXTS[self as usize]
            }

            pub fn is_unknown(self) -> bool {
                matches!(self, Self::Unknown)
            }

            pub fn from_name(name: &str) -> Self {
                let bytes = name.as_bytes();
                if bytes.is_empty() || bytes.len() > Self::MAX_LEN {
                    return Self::Unknown;
                }
                let mut folded = [0u8; $crate::names::LOOKUP_BUFFER];
                for (dst, src) in folded.iter_mut().zip(bytes) {
                    *dst = src.to_ascii_lowercase();
                }
                let Ok(lower) = ::std::str::from_utf8(&folded[..bytes.len()]) else {
                    return Self::Unknown;
                };
                match lower {
                    $($text => Self::$variant,)*
                    _ => Self::Unknown,
                }
            }
        }

        const _: () = assert!(
            $name::MAX_LEN <= $crate::names::LOOKUP_BUFFER,
            "name table entry longer than the lookup buffer"
        );
    };
}

#[cfg(test)]
mod tests {
    crate::define_names! {
        enum Fruit {
            Apple => "apple",
            Kiwi => "kiwi",
            Passion => "passion-fruit",
        }
    }

    #[test]
    fn lookup_folds_ascii_case() {
        assert_eq!(Fruit::from_name("APPLE"), Fruit::Apple);
        assert_eq!(Fruit::from_name("Passion-Fruit"), Fruit::Passion);
        assert_eq!(Fruit::from_name("pear"), Fruit::Unknown);
        assert_eq!(Fruit::from_name(""), Fruit::Unknown);
    }

    #[test]
    fn table_metadata() {
        assert_eq!(Fruit::COUNT, 4);
        assert_eq!(Fruit::MAX_LEN, "passion-fruit".len());
        assert_eq!(Fruit::Kiwi.as_str(), "kiwi");
        assert_eq!(Fruit::Unknown.index(), 0);
        assert!(Fruit::from_name("passion-fruits").is_unknown());
    }
}
