//! Turning row fields into a document to mine.

/// Replace every ASCII punctuation character by a space.
pub fn punctuation_free(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect()
}

/// Punctuation-free every present field and join them with `" , "`.
pub fn join_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fields
        .into_iter()
        .flatten()
        .map(punctuation_free)
        .collect::<Vec<_>>()
        .join(" , ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_free() {
        assert_eq!(punctuation_free("Fort McMurray, Alberta."), "Fort McMurray  Alberta ");
        assert_eq!(punctuation_free("Saint-Étienne"), "Saint Étienne");
    }

    #[test]
    fn test_join_fields_skips_missing() {
        assert_eq!(
            join_fields([Some("Fort McMurray, Alberta"), None, Some("Canada")]),
            "Fort McMurray  Alberta , Canada"
        );
        assert_eq!(join_fields(Vec::<Option<&str>>::new()), "");
    }
}
