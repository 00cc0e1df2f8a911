use backend_test_support::unique_helpers::unique_breed_name;
use pawhaven_backend::adapters::breeds_sea::{BreedCreate, BreedFilter, BreedUpdate};
use pawhaven_backend::entities::breeds::{BreedSize, Species};
use pawhaven_backend::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use pawhaven_backend::services::breeds;
use pawhaven_backend::AppError;

use crate::support::build_test_env;
use crate::support::factory;

fn cat(name: &str) -> BreedCreate {
    BreedCreate {
        name: name.to_string(),
        species: Species::Cat,
        size: Some(BreedSize::Small),
        description: None,
    }
}

#[tokio::test]
async fn names_are_unique_ignoring_case() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let name = unique_breed_name("Siamese");

    let created = breeds::create(env.db(), cat(&format!("  {name}  "))).await?;
    assert_eq!(created.name, name);

    let err = breeds::create(env.db(), cat(&name.to_uppercase())).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::BreedNameTaken, _)));
    Ok(())
}

#[tokio::test]
async fn list_filters_by_species_and_name() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let siamese = breeds::create(env.db(), cat(&unique_breed_name("Siamese"))).await?;
    let dog = factory::breed(env.db()).await?;

    let cats = breeds::list(
        env.db(),
        BreedFilter {
            species: Some(Species::Cat),
            q: None,
        },
    )
    .await?;
    assert!(cats.iter().any(|b| b.id == siamese.id));
    assert!(cats.iter().all(|b| b.species == Species::Cat));

    let by_name = breeds::list(
        env.db(),
        BreedFilter {
            species: None,
            q: Some("labra".to_string()),
        },
    )
    .await?;
    assert!(by_name.iter().any(|b| b.id == dog.id));
    assert!(by_name.iter().all(|b| b.id != siamese.id));
    Ok(())
}

#[tokio::test]
async fn update_keeps_unset_fields() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breed = breeds::create(env.db(), cat(&unique_breed_name("Persian"))).await?;

    let renamed = unique_breed_name("Persian Longhair");
    let updated = breeds::update(
        env.db(),
        breed.id,
        BreedUpdate {
            name: Some(renamed.clone()),
            description: Some(Some("Fluffy".to_string())),
            ..BreedUpdate::default()
        },
    )
    .await?;
    assert_eq!(updated.name, renamed);
    assert_eq!(updated.species, Species::Cat);
    assert_eq!(updated.size, Some(BreedSize::Small));
    assert_eq!(updated.description.as_deref(), Some("Fluffy"));
    Ok(())
}

#[tokio::test]
async fn delete_refuses_breeds_in_use() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let breeder = factory::breeder(env.db()).await?;
    let listing = factory::listing(env.db(), &breeder).await?;

    let err = breeds::delete(env.db(), listing.breed_id).await.unwrap_err();
    assert!(matches!(err, DomainError::Conflict(ConflictKind::BreedInUse, _)));

    let unused = factory::breed(env.db()).await?;
    breeds::delete(env.db(), unused.id).await?;
    let err = breeds::get(env.db(), unused.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(NotFoundKind::Breed, _)));
    Ok(())
}
