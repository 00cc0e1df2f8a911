use backend_test_support::unique_helpers::unique_breed_name;
use pawhaven_backend::adapters::breeds_sea::{BreedCreate, BreedFilter};
use pawhaven_backend::db::txn::with_txn;
use pawhaven_backend::db::txn_policy::{self, TxnPolicy};
use pawhaven_backend::entities::breeds::Species;
use pawhaven_backend::errors::ErrorCode;
use pawhaven_backend::services::breeds;
use pawhaven_backend::AppError;

use crate::support::build_test_env;

fn new_breed(name: &str) -> BreedCreate {
    BreedCreate {
        name: name.to_string(),
        species: Species::Cat,
        size: None,
        description: None,
    }
}

async fn count_named(
    conn: &sea_orm::DatabaseConnection,
    name: &str,
) -> Result<usize, AppError> {
    let found = breeds::list(
        conn,
        BreedFilter {
            species: None,
            q: Some(name.to_string()),
        },
    )
    .await?;
    Ok(found.len())
}

#[tokio::test]
async fn ok_follows_the_process_policy() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let name = unique_breed_name("Siamese");

    let input = new_breed(&name);
    let created = with_txn(None, &env.state, move |txn| {
        Box::pin(async move { Ok(breeds::create(txn, input).await?) })
    })
    .await?;
    assert_eq!(created.name, name);

    let expected = match txn_policy::current() {
        TxnPolicy::CommitOnOk => 1,
        TxnPolicy::RollbackOnOk => 0,
    };
    assert_eq!(count_named(env.db(), &name).await?, expected);
    Ok(())
}

#[tokio::test]
async fn err_rolls_back_earlier_writes() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let name = unique_breed_name("Persian");

    let input = new_breed(&name);
    let err = with_txn(None, &env.state, move |txn| {
        Box::pin(async move {
            breeds::create(txn, input).await?;
            Err::<(), AppError>(AppError::conflict(ErrorCode::Conflict, "abort after insert"))
        })
    })
    .await
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Conflict);

    assert_eq!(count_named(env.db(), &name).await?, 0);
    Ok(())
}

#[tokio::test]
async fn domain_errors_surface_with_their_codes() -> Result<(), AppError> {
    let env = build_test_env().await?;
    let name = unique_breed_name("Maine Coon");
    breeds::create(env.db(), new_breed(&name)).await?;

    let input = new_breed(&name.to_uppercase());
    let err = with_txn(None, &env.state, move |txn| {
        Box::pin(async move { Ok(breeds::create(txn, input).await?) })
    })
    .await
    .unwrap_err();
    assert_eq!(err.code().as_str(), "BREED_NAME_TAKEN");
    Ok(())
}
