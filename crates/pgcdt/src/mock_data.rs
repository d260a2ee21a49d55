use pgcdt_core::contact::Contact;
use pgcdt_core::person::{Address, NewUser, Person};
use pgcdt_core::record::FieldError;

use crate::state::AppState;

/// Users in composite literal form, as `psql` prints the `address` column.
const SEED_USERS: &[(&str, &str)] = &[
    ("Ann", r#"(70897,"Kub Plains",Gaylord,Michigan,25130)"#),
    ("Bob", r#"(78126,"Wiza Mews",Schoenfort,Ohio,61022)"#),
];

/// The fixed person returned by `GET /persons`.
pub fn sample_person() -> Person {
    Person::new(
        "Julie",
        23,
        Address::new(201, "Bartelt Junction", "Duke", "NY", 51023),
    )
}

pub fn sample_contacts() -> Vec<Contact> {
    vec![
        Contact::new("Julie Dsouza", "julie@xyz.com").with_phone("Home", 8899776612),
        Contact::new("John Doe", "john@xyz.com")
            .with_phone("Home", 7766554433)
            .with_phone("Work", 9876543210),
    ]
}

pub fn sample_users() -> Result<Vec<NewUser>, FieldError> {
    SEED_USERS
        .iter()
        .map(|(name, address)| -> Result<NewUser, FieldError> {
            Ok(NewUser::new(*name, address.parse::<Address>()?))
        })
        .collect()
}

/// Rows written by [`seed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: u64,
    pub contacts: u64,
    pub tagged_contacts: u64,
}

/// Inserts the sample users and contacts. Contacts go to both the object and
/// the tagged-array tables.
pub async fn seed(state: &AppState) -> anyhow::Result<SeedSummary> {
    let contacts = sample_contacts();
    let summary = SeedSummary {
        users: state.user_repo.persist(&sample_users()?).await?,
        contacts: state.contact_repo.persist(&contacts).await?,
        tagged_contacts: state.tagged_contact_repo.persist(&contacts).await?,
    };

    tracing::info!(?summary, "Seeded sample data");

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_users_parse() {
        let users = sample_users().unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].address.block_number, 70897);
        assert_eq!(users[0].address.street_address, "Kub Plains");
        assert_eq!(users[1].address.block_number, 78126);
    }

    #[tokio::test]
    async fn test_seed_in_memory() {
        let state = AppState::in_memory();

        assert_eq!(
            seed(&state).await.unwrap(),
            SeedSummary {
                users: 2,
                contacts: 2,
                tagged_contacts: 2,
            }
        );

        let users = state.user_repo.fetch_by_pin_code(25130).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].name, "Ann");

        let work = state
            .tagged_contact_repo
            .fetch_numbers_with_tag("Work")
            .await
            .unwrap();
        assert_eq!(work, vec![9876543210]);
    }

    #[tokio::test]
    async fn test_seed_twice_rejects_duplicate_contacts() {
        let state = AppState::in_memory();
        seed(&state).await.unwrap();

        assert!(seed(&state).await.is_err());
    }
}
