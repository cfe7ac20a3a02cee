//! Site structure lookups; locales and directories are public data

use folio_core::impl_query;
use folio_core::model::{Locale, WebDirectory};
use folio_store::errors::Result;
use folio_store::repo::SqliteSiteRepo;

use crate::executor::{HandlerContext, HandlerRegistry, QueryHandler};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAllLocalesQuery;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAllWebDirectoriesQuery;

impl_query!(
    GetAllLocalesQuery => Vec<Locale>,
    GetAllWebDirectoriesQuery => Vec<WebDirectory>,
);

struct GetAllLocalesHandler;

impl QueryHandler for GetAllLocalesHandler {
    type Query = GetAllLocalesQuery;

    fn execute(&self, _query: GetAllLocalesQuery, ctx: &HandlerContext<'_>) -> Result<Vec<Locale>> {
        SqliteSiteRepo::list_locales(ctx.conn())
    }
}

struct GetAllWebDirectoriesHandler;

impl QueryHandler for GetAllWebDirectoriesHandler {
    type Query = GetAllWebDirectoriesQuery;

    fn execute(
        &self,
        _query: GetAllWebDirectoriesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<WebDirectory>> {
        SqliteSiteRepo::list_web_directories(ctx.conn())
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_query(GetAllLocalesHandler)?;
    registry.register_query(GetAllWebDirectoriesHandler)?;
    Ok(())
}
