use std::borrow::Cow;

/// Appends the delivery id to a diagnostic message, so that it can be matched with
/// the delivery log of the GitHub App.
pub fn with_delivery<'a>(message: &'a str, delivery: Option<&str>) -> Cow<'a, str> {
    match delivery {
        Some(delivery) => format!("{message} (delivery {delivery})").into(),
        None => message.into(),
    }
}

/// Pluralizes a piece of text.
pub fn pluralize(base: &str, count: usize) -> Cow<'_, str> {
    if count == 1 {
        base.into()
    } else {
        format!("{base}s").into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_suffix() {
        assert_eq!(
            with_delivery("unauthorized", Some("abc")),
            "unauthorized (delivery abc)"
        );
    }

    #[test]
    fn no_delivery() {
        assert_eq!(with_delivery("unauthorized", None), "unauthorized");
    }

    #[test]
    fn pluralize_zero() {
        assert_eq!(pluralize("request", 0), "requests");
    }

    #[test]
    fn pluralize_one() {
        assert_eq!(pluralize("request", 1), "request");
    }
}
