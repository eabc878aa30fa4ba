//! The tag vocabulary emitted into the flat tree encoding.
//!
//! Every [`crate::node::Node`] variant serializes to exactly one of these
//! tags, in the same postfix order the analyzer discovers it. The set and
//! naming mirror the reference compiler's tree tag enumeration (`is_operator`
//! / `is_expression` in its tree module) rather than inventing a fresh
//! vocabulary, since the flat encoding exists to hand data to a code
//! generator built against that vocabulary.
#![allow(non_camel_case_types)]

/// One entry of the flat, postfix, append-only tree stream.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(i32)]
pub enum Tag {
    // --- declarations ---
    TFuncdef = 1,
    TDeclid = 2,
    TDeclarr = 3,
    TStructbeg = 4,
    TStructend = 5,
    TBeginit = 6,
    TStructinit = 7,

    // --- statements ---
    TBegin = 10,
    TEnd = 11,
    TIf = 12,
    TFor = 13,
    TDo = 14,
    TWhile = 15,
    TSwitch = 16,
    TCase = 17,
    TDefault = 18,
    TReturnval = 19,
    TReturnvoid = 20,
    TBreak = 21,
    TContinue = 22,
    TGoto = 23,
    TLabel = 24,
    NOP = 25,
    TPrintid = 26,
    TPrintf = 27,
    TGetid = 28,
    TPrint = 29,

    // --- messaging / thread extensions ---
    CREATEDIRECTC = 30,
    EXITC = 31,

    // --- expressions ---
    TCondexpr = 40,
    TSelect = 41,
    TAddrtoval = 42,
    TAddrtovald = 43,
    TIdenttoval = 44,
    TIdenttovald = 45,
    TIdenttoaddr = 46,
    TIdent = 47,
    TConst = 48,
    TConstd = 49,
    TString = 50,
    TStringd = 51,
    TSliceident = 52,
    TSlice = 53,
    TCall1 = 54,
    TCall2 = 55,
    TExprend = 56,
}

impl TryFrom<i32> for Tag {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        use Tag::*;
        const TABLE: &[Tag] = &[
            TFuncdef, TDeclid, TDeclarr, TStructbeg, TStructend, TBeginit, TStructinit, TBegin,
            TEnd, TIf, TFor, TDo, TWhile, TSwitch, TCase, TDefault, TReturnval, TReturnvoid,
            TBreak, TContinue, TGoto, TLabel, NOP, TPrintid, TPrintf, TGetid, TPrint,
            CREATEDIRECTC, EXITC, TCondexpr, TSelect, TAddrtoval, TAddrtovald, TIdenttoval,
            TIdenttovald, TIdenttoaddr, TIdent, TConst, TConstd, TString, TStringd, TSliceident,
            TSlice, TCall1, TCall2, TExprend,
        ];
        TABLE.iter().copied().find(|t| *t as i32 == value).ok_or(())
    }
}

impl Tag {
    /// Tags that open a paired construct and therefore push a balance
    /// obligation the validator must see closed (`TBegin`/`TEnd`,
    /// `TStructbeg`/`TStructend`, `CREATEDIRECTC`/`EXITC`).
    pub fn is_open(self) -> bool {
        matches!(self, Tag::TBegin | Tag::TStructbeg | Tag::CREATEDIRECTC)
    }

    pub fn is_close(self) -> bool {
        matches!(self, Tag::TEnd | Tag::TStructend | Tag::EXITC)
    }

    /// The close tag that balances this open tag, if any.
    pub fn matching_close(self) -> Option<Tag> {
        match self {
            Tag::TBegin => Some(Tag::TEnd),
            Tag::TStructbeg => Some(Tag::TStructend),
            Tag::CREATEDIRECTC => Some(Tag::EXITC),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_close_pairs_are_symmetric() {
        for tag in [Tag::TBegin, Tag::TStructbeg, Tag::CREATEDIRECTC] {
            assert!(tag.is_open());
            let close = tag.matching_close().unwrap();
            assert!(close.is_close());
        }
    }
}
