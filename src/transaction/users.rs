//! Builds the list of users that own transactions, for filter drop-downs.

use std::cmp::Ordering;

use serde::Serialize;

/// A user that owns at least one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntry {
    /// The user ID as stored on transactions.
    pub id: String,
    /// A human friendly version of the user ID, see [display_name].
    pub display_name: String,
}

/// Turn a user ID into a display name, e.g. "john_doe" becomes "John Doe".
///
/// Underscores become spaces and the first letter of each word is capitalised.
pub fn display_name(user_id: &str) -> String {
    let mut name = String::with_capacity(user_id.len());
    let mut previous_is_word = false;

    for char in user_id.chars() {
        let char = if char == '_' { ' ' } else { char };

        if char.is_alphanumeric() && !previous_is_word {
            name.extend(char.to_uppercase());
        } else {
            name.push(char);
        }

        previous_is_word = char.is_alphanumeric();
    }

    name
}

/// The first run of ASCII digits in `text`, if any.
fn first_number(text: &str) -> Option<&str> {
    let start = text.find(|char: char| char.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|char: char| !char.is_ascii_digit())
        .unwrap_or(rest.len());

    Some(&rest[..end])
}

/// Compare two runs of digits by their numeric value, without parsing them
/// into a fixed size integer.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');

    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Order users for display.
///
/// If both IDs contain a number, the users are ordered by the first number in
/// their IDs. Otherwise they are ordered by display name, ignoring case.
///
/// Note that this ordering is not transitive when IDs with and without numbers
/// are mixed, so it must only be used with [insertion_sort].
pub fn compare_users(a: &UserEntry, b: &UserEntry) -> Ordering {
    if let (Some(a_number), Some(b_number)) = (first_number(&a.id), first_number(&b.id)) {
        return compare_numbers(a_number, b_number);
    }

    a.display_name
        .to_lowercase()
        .cmp(&b.display_name.to_lowercase())
        .then_with(|| a.display_name.cmp(&b.display_name))
}

/// A stable insertion sort.
///
/// Unlike the standard library sorts, this never panics if `compare` is not a
/// total order, and for a given input always produces the same output.
fn insertion_sort<T>(items: &mut [T], compare: impl Fn(&T, &T) -> Ordering) {
    for i in 1..items.len() {
        let mut j = i;

        while j > 0 && compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Build the user list from the distinct user IDs in the store.
///
/// `user_ids` should be in ascending order, as returned by the store. Blank
/// IDs are skipped.
pub fn build_user_directory(user_ids: Vec<String>) -> Vec<UserEntry> {
    let mut users: Vec<UserEntry> = user_ids
        .into_iter()
        .filter(|id| !id.trim().is_empty())
        .map(|id| UserEntry {
            display_name: display_name(&id),
            id,
        })
        .collect();

    insertion_sort(&mut users, compare_users);

    users
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use super::{UserEntry, build_user_directory, compare_users, display_name};

    fn entry(id: &str) -> UserEntry {
        UserEntry {
            id: id.to_owned(),
            display_name: display_name(id),
        }
    }

    fn ids(users: &[UserEntry]) -> Vec<&str> {
        users.iter().map(|user| user.id.as_str()).collect()
    }

    #[test]
    fn display_name_capitalises_words() {
        assert_eq!(display_name("john_doe"), "John Doe");
        assert_eq!(display_name("user2"), "User2");
        assert_eq!(display_name("alice1"), "Alice1");
        assert_eq!(display_name("bob"), "Bob");
        assert_eq!(display_name("mary-jane o'neil"), "Mary-Jane O'Neil");
        assert_eq!(display_name("émile_zola"), "Émile Zola");
    }

    #[test]
    fn numbers_are_compared_by_value() {
        assert_eq!(
            compare_users(&entry("user10"), &entry("user9")),
            Ordering::Greater
        );
        assert_eq!(
            compare_users(&entry("user007"), &entry("agent7")),
            Ordering::Equal
        );
        assert_eq!(
            compare_users(&entry("user99999999999999999999"), &entry("user100000000000000000000")),
            Ordering::Less
        );
    }

    #[test]
    fn names_are_compared_ignoring_case_first() {
        assert_eq!(compare_users(&entry("Bob"), &entry("alice")), Ordering::Greater);
        assert_eq!(compare_users(&entry("Bob"), &entry("bob")), Ordering::Less);
    }

    #[test]
    fn directory_order_for_mixed_ids() {
        let users = build_user_directory(
            ["john_doe", "user2", "alice1", "bob"]
                .map(str::to_owned)
                .to_vec(),
        );

        assert_eq!(ids(&users), vec!["alice1", "bob", "john_doe", "user2"]);
        assert_eq!(users[2].display_name, "John Doe");
    }

    #[test]
    fn directory_orders_numbered_users_numerically() {
        let users = build_user_directory(
            ["user1", "user10", "user2", "user20"]
                .map(str::to_owned)
                .to_vec(),
        );

        assert_eq!(ids(&users), vec!["user1", "user2", "user10", "user20"]);
    }

    #[test]
    fn directory_skips_blank_ids() {
        let users = build_user_directory(vec!["".to_owned(), "  ".to_owned(), "bob".to_owned()]);

        assert_eq!(ids(&users), vec!["bob"]);
    }

    #[test]
    fn directory_is_deterministic() {
        let input: Vec<String> = ["zed", "user3", "Amy", "x1", "bob", "user12", "amy"]
            .map(str::to_owned)
            .to_vec();

        let first = build_user_directory(input.clone());
        let second = build_user_directory(input);

        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }
}
