#[cfg(test)]
pub mod test_db {
    use crate::db::create_competition;
    use crate::error::AppError;
    use crate::models::{NewRegistration, NewSubmission};
    use rocket::local::asynchronous::Client;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;

    static INIT: Once = Once::new();

    struct TestCompetition {
        slug: String,
        title: String,
        is_open: bool,
        cap: Option<i64>,
    }

    #[derive(Default)]
    pub struct TestDbBuilder {
        competitions: Vec<TestCompetition>,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn competition(mut self, slug: &str, title: &str) -> Self {
            self.competitions.push(TestCompetition {
                slug: slug.to_string(),
                title: title.to_string(),
                is_open: true,
                cap: None,
            });
            self
        }

        pub fn closed_competition(mut self, slug: &str, title: &str) -> Self {
            self.competitions.push(TestCompetition {
                slug: slug.to_string(),
                title: title.to_string(),
                is_open: false,
                cap: None,
            });
            self
        }

        pub fn capped_competition(mut self, slug: &str, title: &str, cap: i64) -> Self {
            self.competitions.push(TestCompetition {
                slug: slug.to_string(),
                title: title.to_string(),
                is_open: true,
                cap: Some(cap),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .parse_filters("debug")
                    .is_test(true)
                    .try_init();
            });

            // One connection so every query sees the same in-memory database
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;

            let mut competition_id_map: HashMap<String, i64> = HashMap::new();

            for comp in &self.competitions {
                let id =
                    create_competition(&pool, &comp.slug, &comp.title, comp.is_open, comp.cap)
                        .await?;
                competition_id_map.insert(comp.slug.clone(), id);
            }

            Ok(TestDb {
                pool,
                competition_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub competition_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn competition_id(&self, slug: &str) -> Option<i64> {
            self.competition_id_map.get(slug).copied()
        }
    }

    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .competition("web", "Web Developing")
            .competition("video", "Video Editing")
            .competition("graphic", "Graphic Design")
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let client = Client::tracked(crate::init_rocket(test_db.pool.clone()).await)
            .await
            .expect("Failed to build test client");

        (client, test_db)
    }

    pub fn registration_input(
        slug: &str,
        name: &str,
        index_no: &str,
        grade: i64,
        class_letter: &str,
        email: &str,
    ) -> NewRegistration {
        NewRegistration {
            category_slug: slug.to_string(),
            name: name.to_string(),
            index_no: index_no.to_string(),
            grade,
            class_letter: class_letter.to_string(),
            email: email.to_string(),
            whatsapp: "0712345678".to_string(),
        }
    }

    pub fn submission_input(slug: &str, index_no: &str) -> NewSubmission {
        NewSubmission {
            category_slug: slug.to_string(),
            index_no: index_no.to_string(),
            text: "Project deliverable".to_string(),
            drive_url: "https://drive.google.com/file/d/abc123/view".to_string(),
            grade: None,
            class_letter: None,
        }
    }
}
