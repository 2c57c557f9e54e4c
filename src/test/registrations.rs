#[cfg(test)]
mod tests {
    use crate::db::{count_registrations, find_registrations_by_index, register_participant};
    use crate::error::AppError;
    use crate::normalize::{REFERENCE_CODE_ALPHABET, REFERENCE_CODE_LENGTH};
    use crate::test::test_utils::{TestDbBuilder, create_standard_test_db, registration_input};

    use rocket::tokio;

    #[tokio::test]
    async fn test_register_success_returns_reference_code() {
        let test_db = create_standard_test_db().await;

        let input = registration_input("web", "Nethmi Perera", "123", 10, "B", "nethmi@example.com");
        let receipt = register_participant(&test_db.pool, &input)
            .await
            .expect("registration should succeed");

        assert!(receipt.id > 0);
        assert_eq!(receipt.reference_code.len(), REFERENCE_CODE_LENGTH);
        assert!(
            receipt
                .reference_code
                .bytes()
                .all(|b| REFERENCE_CODE_ALPHABET.contains(&b))
        );
    }

    #[tokio::test]
    async fn test_register_stores_normalized_fields() {
        let test_db = create_standard_test_db().await;

        let mut input =
            registration_input("web", "  Kasun Silva  ", " 456 ", 3, " b ", " Kasun@Example.COM ");
        input.whatsapp = "071-234 5678".to_string();

        register_participant(&test_db.pool, &input)
            .await
            .expect("registration should succeed");

        let comp_id = test_db.competition_id("web").unwrap();
        let rows = find_registrations_by_index(&test_db.pool, comp_id, "456")
            .await
            .expect("lookup by trimmed index");
        assert_eq!(rows.len(), 1);

        let reg = &rows[0];
        assert_eq!(reg.name, "Kasun Silva");
        assert_eq!(reg.grade, 6); // clamped up from 3
        assert_eq!(reg.class_letter, "B");
        assert_eq!(reg.email, "kasun@example.com");
        assert_eq!(reg.whatsapp, "+94712345678");
        assert_eq!(reg.competition_title, "Web Developing");
    }

    #[tokio::test]
    async fn test_register_unknown_competition() {
        let test_db = create_standard_test_db().await;

        let input = registration_input("robotics", "A", "1", 10, "A", "a@example.com");
        let err = register_participant(&test_db.pool, &input)
            .await
            .expect_err("unknown slug must fail");

        assert!(matches!(err, AppError::CompetitionNotFound));
    }

    #[tokio::test]
    async fn test_register_closed_competition() {
        let test_db = TestDbBuilder::new()
            .closed_competition("web", "Web Developing")
            .build()
            .await
            .expect("test db");

        let input = registration_input("web", "A", "1", 10, "A", "a@example.com");
        let err = register_participant(&test_db.pool, &input)
            .await
            .expect_err("closed competition must fail");

        assert!(matches!(err, AppError::RegistrationsClosed));

        let comp_id = test_db.competition_id("web").unwrap();
        let count = count_registrations(&test_db.pool, comp_id).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_roll_rejected_within_competition() {
        let test_db = create_standard_test_db().await;

        let first = registration_input("web", "Nethmi", "123", 10, "B", "nethmi@example.com");
        register_participant(&test_db.pool, &first)
            .await
            .expect("first registration");

        // Different name and email, identical roll identity
        let second = registration_input("web", "Someone Else", "123", 10, "B", "other@example.com");
        let err = register_participant(&test_db.pool, &second)
            .await
            .expect_err("duplicate roll must fail");
        assert!(matches!(err, AppError::DuplicateRoll));

        // The same roll identity in a different competition is fine
        let other_comp = registration_input("video", "Someone Else", "123", 10, "B", "other@example.com");
        register_participant(&test_db.pool, &other_comp)
            .await
            .expect("same roll in another competition");
    }

    #[tokio::test]
    async fn test_duplicate_roll_matches_after_normalization() {
        let test_db = create_standard_test_db().await;

        let first = registration_input("web", "Nethmi", "123", 10, "B", "nethmi@example.com");
        register_participant(&test_db.pool, &first)
            .await
            .expect("first registration");

        // Same identity spelled differently: lowercase class, padded index
        let second = registration_input("web", "Nethmi", " 123 ", 10, " b ", "second@example.com");
        let err = register_participant(&test_db.pool, &second)
            .await
            .expect_err("normalized duplicate must fail");
        assert!(matches!(err, AppError::DuplicateRoll));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_within_competition() {
        let test_db = create_standard_test_db().await;

        let first = registration_input("web", "Nethmi", "123", 10, "B", "shared@example.com");
        register_participant(&test_db.pool, &first)
            .await
            .expect("first registration");

        let second = registration_input("web", "Kasun", "999", 11, "C", " Shared@Example.com ");
        let err = register_participant(&test_db.pool, &second)
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, AppError::DuplicateEmail));

        // Same email in another competition is allowed
        let other = registration_input("graphic", "Nethmi", "123", 10, "B", "shared@example.com");
        register_participant(&test_db.pool, &other)
            .await
            .expect("same email in another competition");
    }

    #[tokio::test]
    async fn test_capacity_enforced() {
        let test_db = TestDbBuilder::new()
            .capped_competition("quiz", "ICT Quiz", 1)
            .build()
            .await
            .expect("test db");

        let first = registration_input("quiz", "Nethmi", "123", 10, "B", "nethmi@example.com");
        register_participant(&test_db.pool, &first)
            .await
            .expect("first registration fills the cap");

        // Distinct roll and email, still rejected on capacity
        let second = registration_input("quiz", "Kasun", "456", 11, "C", "kasun@example.com");
        let err = register_participant(&test_db.pool, &second)
            .await
            .expect_err("cap must reject the second registration");
        assert!(matches!(err, AppError::CapacityReached));

        let comp_id = test_db.competition_id("quiz").unwrap();
        let count = count_registrations(&test_db.pool, comp_id).await.unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_reference_codes_distinct_across_registrations() {
        let test_db = create_standard_test_db().await;

        let mut codes = std::collections::HashSet::new();
        for i in 0..10 {
            let input = registration_input(
                "web",
                &format!("Student {}", i),
                &format!("{}", 100 + i),
                10,
                "B",
                &format!("student{}@example.com", i),
            );
            let receipt = register_participant(&test_db.pool, &input)
                .await
                .expect("registration");
            assert!(
                codes.insert(receipt.reference_code.clone()),
                "duplicate reference code {}",
                receipt.reference_code
            );
        }
    }
}
