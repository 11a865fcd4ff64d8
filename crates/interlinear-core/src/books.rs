/*
 * books.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * New Testament book table.
 */

//! New Testament book table.
//!
//! Books use the traditional numbering in which Matthew is 40 and
//! Revelation is 66; OpenGNT keys its rows the same way.

/// A New Testament book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Book {
    /// Traditional book number (40..=66)
    pub number: u8,
    /// Display name, e.g. "1 Corinthians"
    pub name: &'static str,
    /// Number of chapters in the book
    pub chapters: u32,
    aliases: &'static [&'static str],
}

const fn book(
    number: u8,
    name: &'static str,
    chapters: u32,
    aliases: &'static [&'static str],
) -> Book {
    Book {
        number,
        name,
        chapters,
        aliases,
    }
}

/// All New Testament books in canonical order.
pub static BOOKS: [Book; 27] = [
    book(40, "Matthew", 28, &["matt", "mt"]),
    book(41, "Mark", 16, &["mk"]),
    book(42, "Luke", 24, &["lk"]),
    book(43, "John", 21, &["jn"]),
    book(44, "Acts", 28, &[]),
    book(45, "Romans", 16, &["rom"]),
    book(46, "1 Corinthians", 16, &["1cor"]),
    book(47, "2 Corinthians", 13, &["2cor"]),
    book(48, "Galatians", 6, &["gal"]),
    book(49, "Ephesians", 6, &["eph"]),
    book(50, "Philippians", 4, &["phil"]),
    book(51, "Colossians", 4, &["col"]),
    book(52, "1 Thessalonians", 5, &["1thess"]),
    book(53, "2 Thessalonians", 3, &["2thess"]),
    book(54, "1 Timothy", 6, &["1tim"]),
    book(55, "2 Timothy", 4, &["2tim"]),
    book(56, "Titus", 3, &[]),
    book(57, "Philemon", 1, &["phlm"]),
    book(58, "Hebrews", 13, &["heb"]),
    book(59, "James", 5, &["jas"]),
    book(60, "1 Peter", 5, &["1pet"]),
    book(61, "2 Peter", 3, &["2pet"]),
    book(62, "1 John", 5, &["1jn"]),
    book(63, "2 John", 1, &["2jn"]),
    book(64, "3 John", 1, &["3jn"]),
    book(65, "Jude", 1, &[]),
    book(66, "Revelation", 22, &["rev"]),
];

impl Book {
    /// Look up a book by name or alias.
    ///
    /// Matching ignores case and whitespace, so "1 John", "1john" and
    /// "1JN" all resolve to the same book.
    pub fn find(name: &str) -> Option<&'static Book> {
        let key = squash(name);
        if key.is_empty() {
            return None;
        }
        BOOKS
            .iter()
            .find(|b| squash(b.name) == key || b.aliases.contains(&key.as_str()))
    }

    /// Look up a book by its traditional number.
    pub fn by_number(number: u8) -> Option<&'static Book> {
        BOOKS.iter().find(|b| b.number == number)
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_name_and_alias() {
        assert_eq!(Book::find("John").map(|b| b.number), Some(43));
        assert_eq!(Book::find("jn").map(|b| b.number), Some(43));
        assert_eq!(Book::find("1 John").map(|b| b.number), Some(62));
        assert_eq!(Book::find("1john").map(|b| b.number), Some(62));
        assert_eq!(Book::find("  EPHESIANS ").map(|b| b.number), Some(49));
    }

    #[test]
    fn test_find_rejects_unknown_books() {
        assert!(Book::find("Zephaniah").is_none());
        assert!(Book::find("").is_none());
    }

    #[test]
    fn test_books_are_numbered_consecutively() {
        for (i, b) in BOOKS.iter().enumerate() {
            assert_eq!(b.number as usize, 40 + i);
            assert_eq!(Book::by_number(b.number), Some(b));
        }
    }
}
