use std::fmt::{Debug, Display};

/// The type of symbols that label transitions. Automata in this crate read words over `char`.
pub type Symbol = char;

/// A finite alphabet of [`Symbol`]s.
///
/// The symbols are kept sorted and free of duplicates, so that the position of a symbol (see
/// [`CharAlphabet::index_of`]) and the order of [`CharAlphabet::universe`] are fixed. Everything that
/// needs a reproducible order on symbols, for example canonicalization or the enumeration of
/// edits, relies on this order.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct CharAlphabet(Vec<Symbol>);

/// Helper macro for creating a [`CharAlphabet`]. Is called simply with a list of symbols
/// that are separated by commata.
#[macro_export]
macro_rules! alphabet {
    ($($c:literal),* $(,)?) => {
        $crate::alphabet::CharAlphabet::new([$($c),*])
    };
}

impl CharAlphabet {
    /// Creates a new alphabet from an iterator over the symbols. The symbols are sorted and
    /// duplicates are removed.
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        let mut symbols: Vec<_> = symbols.into_iter().collect();
        symbols.sort_unstable();
        symbols.dedup();
        Self(symbols)
    }

    /// Creates an alphabet consisting of the first `size` lowercase latin letters.
    pub fn alphabetic(size: usize) -> Self {
        assert!(size <= 26, "Alphabet can contain at most 26 letters");
        Self::new(('a'..='z').take(size))
    }

    /// Returns an iterator over all symbols in ascending order.
    pub fn universe(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.0.iter().copied()
    }

    /// Returns the symbols as a slice, in ascending order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.0
    }

    /// Returns true if the given symbol is present in the alphabet.
    pub fn contains(&self, symbol: Symbol) -> bool {
        self.index_of(symbol).is_some()
    }

    /// Gives the position of `symbol` in the alphabet, if it is present.
    pub fn index_of(&self, symbol: Symbol) -> Option<usize> {
        self.0.binary_search(&symbol).ok()
    }

    /// Returns the symbol at the given position.
    pub fn get(&self, index: usize) -> Option<Symbol> {
        self.0.get(index).copied()
    }

    /// The number of symbols.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the alphabet has no symbols.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Symbol> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = Symbol>>(iter: T) -> Self {
        Self::new(iter)
    }
}

impl From<&str> for CharAlphabet {
    fn from(value: &str) -> Self {
        Self::new(value.chars())
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = Symbol;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl Debug for CharAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for CharAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, sym) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{sym}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::CharAlphabet;
    use pretty_assertions::assert_eq;

    #[test]
    fn symbols_are_sorted_and_unique() {
        let alphabet = CharAlphabet::new(['b', 'a', 'b', 'c']);
        assert_eq!(alphabet.symbols(), &['a', 'b', 'c']);
        assert_eq!(alphabet.index_of('c'), Some(2));
        assert_eq!(alphabet.index_of('d'), None);
        assert_eq!(alphabet, alphabet!('c', 'b', 'a'));
        assert_eq!(format!("{alphabet}"), "{a, b, c}");
    }

    #[test]
    fn empty_alphabet() {
        let alphabet = CharAlphabet::default();
        assert!(alphabet.is_empty());
        assert_eq!(alphabet.universe().count(), 0);
    }
}
