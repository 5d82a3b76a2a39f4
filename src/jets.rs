use {
    crate::*,
    glam::I64Vec2,
    nom::{
        character::complete::one_of, combinator::map, error::Error, multi::many1, Err, IResult,
    },
};

/// One entry in the cyclic perturbation sequence, applied before each gravity step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Jet {
    Left,
    Right,
}

impl Jet {
    #[inline]
    pub const fn vec(self) -> I64Vec2 {
        match self {
            Self::Left => I64Vec2::NEG_X,
            Self::Right => I64Vec2::X,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct InvalidJetChar(pub char);

impl TryFrom<char> for Jet {
    type Error = InvalidJetChar;

    fn try_from(jet_char: char) -> Result<Self, Self::Error> {
        match jet_char {
            '<' => Ok(Self::Left),
            '>' => Ok(Self::Right),
            _ => Err(InvalidJetChar(jet_char)),
        }
    }
}

impl Parse for Jet {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map(one_of("<>"), |jet_char: char| {
            jet_char.try_into().unwrap()
        })(input)
    }
}

/// An ordered, cyclically indexed jet sequence.
///
/// Parsing requires at least one jet, so any `JetPattern` obtained through `Parse` or
/// `TryFrom<&str>` is non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct JetPattern(Vec<Jet>);

impl JetPattern {
    pub fn new(jets: Vec<Jet>) -> Self {
        Self(jets)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The jet sequence index for the given application counter.
    ///
    /// The pattern must be non-empty.
    pub fn phase(&self, jets_applied: u64) -> usize {
        (jets_applied % self.0.len() as u64) as usize
    }

    pub fn jet(&self, jets_applied: u64) -> Jet {
        self.0[self.phase(jets_applied)]
    }
}

impl Parse for JetPattern {
    fn parse<'i>(input: &'i str) -> IResult<&'i str, Self> {
        map(many1(Jet::parse), Self)(input)
    }
}

impl<'i> TryFrom<&'i str> for JetPattern {
    type Error = Err<Error<&'i str>>;

    fn try_from(input: &'i str) -> Result<Self, Self::Error> {
        Ok(Self::parse(input)?.1)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, std::sync::OnceLock};

    const JET_PATTERN_STR: &str = ">>><<><>><<<>><>>><<<>>><<<><<<>><>><<>>";

    fn jet_pattern() -> &'static JetPattern {
        use {Jet::Left as L, Jet::Right as R};

        static ONCE_LOCK: OnceLock<JetPattern> = OnceLock::new();

        ONCE_LOCK.get_or_init(|| {
            JetPattern(vec![
                R, R, R, L, L, R, L, R, R, L, L, L, R, R, L, R, R, R, L, L, L, R, R, R, L, L, L,
                R, L, L, L, R, R, L, R, R, L, L, R, R,
            ])
        })
    }

    #[test]
    fn test_jet_pattern_try_from_str() {
        assert_eq!(JET_PATTERN_STR.try_into().as_ref(), Ok(jet_pattern()));
    }

    #[test]
    fn test_jet_pattern_try_from_str_with_trailing_line_ending() {
        let jet_pattern_string: String = format!("{JET_PATTERN_STR}\n");

        assert_eq!(
            JetPattern::try_from(jet_pattern_string.as_str()).as_ref(),
            Ok(jet_pattern())
        );
    }

    #[test]
    fn test_jet_pattern_try_from_empty_str() {
        assert!(JetPattern::try_from("").is_err());
    }

    #[test]
    fn test_jet_try_from_char() {
        assert_eq!('<'.try_into(), Ok(Jet::Left));
        assert_eq!('>'.try_into(), Ok(Jet::Right));
        assert_eq!(Jet::try_from('^'), Err(InvalidJetChar('^')));
    }

    #[test]
    fn test_jet_pattern_cycles() {
        let jet_pattern: &JetPattern = jet_pattern();
        let len: u64 = jet_pattern.len() as u64;

        for jets_applied in 0_u64..len {
            assert_eq!(
                jet_pattern.jet(jets_applied),
                jet_pattern.jet(jets_applied + len)
            );
        }

        assert_eq!(jet_pattern.phase(len), 0_usize);
    }
}
