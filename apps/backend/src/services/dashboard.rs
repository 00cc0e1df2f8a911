//! Fetch the rows each dashboard aggregates.

use sea_orm::ConnectionTrait;

use crate::domain::dashboard::{self, AdminDashboard, BreederDashboard, SeekerDashboard};
use crate::errors::domain::DomainError;
use crate::repos::{applications, listings, payouts, transactions, users};

pub async fn seeker<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<SeekerDashboard, DomainError> {
    let apps = applications::list_by_seeker(conn, user_id).await?;
    let txs = transactions::list_by_payer(conn, user_id).await?;
    Ok(dashboard::seeker(&apps, &txs))
}

pub async fn breeder<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    breeder_id: i64,
    commission_bps: u32,
) -> Result<BreederDashboard, DomainError> {
    let own_listings = listings::list_by_breeder(conn, breeder_id).await?;
    let apps = applications::list_for_breeder(conn, breeder_id, None).await?;
    let txs = transactions::list_by_breeder(conn, breeder_id).await?;
    let own_payouts = payouts::list_by_breeder(conn, breeder_id).await?;
    Ok(dashboard::breeder(
        &own_listings,
        &apps,
        &txs,
        &own_payouts,
        commission_bps,
    ))
}

pub async fn admin<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    commission_bps: u32,
) -> Result<AdminDashboard, DomainError> {
    let all_users = users::list_users(conn).await?;
    let all_listings = listings::list_all(conn).await?;
    let txs = transactions::list_all(conn).await?;
    let all_payouts = payouts::list_all(conn).await?;
    Ok(dashboard::admin(
        &all_users,
        &all_listings,
        &txs,
        &all_payouts,
        commission_bps,
    ))
}
