use crate::api::UserRecord;

/// Keep users whose username or email contains `query`, ignoring case.
///
/// A blank query keeps everything.
pub fn apply_search(users: &[UserRecord], query: &str) -> Vec<UserRecord> {
    let keyword = query.trim().to_lowercase();
    if keyword.is_empty() {
        return users.to_vec();
    }

    users
        .iter()
        .filter(|user| {
            user.username.to_lowercase().contains(&keyword)
                || user.email.to_lowercase().contains(&keyword)
        })
        .cloned()
        .collect()
}

/// Items `[(page - 1) * page_size, page * page_size)`; pages start at 1.
pub fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Vec<T> {
    let page_size = page_size as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(page_size);
    items.iter().skip(start).take(page_size).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserStatus;

    fn users() -> Vec<UserRecord> {
        vec![
            UserRecord::new("Alice", "alice@example.com", UserStatus::Approved),
            UserRecord::new("bob", "BOB@Mail.io", UserStatus::Pending),
            UserRecord::new("carol", "c@example.com", UserStatus::Banned),
        ]
    }

    fn names(users: &[UserRecord]) -> Vec<&str> {
        users.iter().map(|u| u.username.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_on_username_or_email() {
        assert_eq!(names(&apply_search(&users(), "ALI")), vec!["Alice"]);
        assert_eq!(names(&apply_search(&users(), "mail.IO")), vec!["bob"]);
        assert_eq!(
            names(&apply_search(&users(), "example")),
            vec!["Alice", "carol"]
        );
        assert!(apply_search(&users(), "nobody").is_empty());
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        assert_eq!(apply_search(&users(), "").len(), 3);
        assert_eq!(apply_search(&users(), "   ").len(), 3);
    }

    #[test]
    fn test_search_trims_query() {
        assert_eq!(names(&apply_search(&users(), "  bob ")), vec!["bob"]);
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=5).collect();
        assert_eq!(paginate(&items, 1, 2), vec![1, 2]);
        assert_eq!(paginate(&items, 3, 2), vec![5]);
        assert!(paginate(&items, 4, 2).is_empty());
        assert_eq!(paginate(&items, 0, 2), vec![1, 2]);
    }
}
