use std::collections::HashMap;

use folio_core::model::{
    PageDetails, PageRenderDetails, PageRoute, PageSummary, PagedQueryResult,
    WorkflowStatusQuery,
};
use folio_store::errors::Result;

use super::{repository_context, Dispatcher};
use crate::commands::pages::{
    AddPageCommand, AddPageDraftVersionCommand, DeletePageCommand, DeletePageDraftVersionCommand,
    PublishPageCommand, UnPublishPageCommand, UpdatePageDraftVersionCommand, UpdatePageUrlCommand,
};
use crate::queries::pages::{
    GetAllPageRoutesQuery, GetPageDetailsByIdQuery, GetPageRenderDetailsByIdQuery,
    GetPageRenderDetailsByIdRangeQuery, GetPageRouteByIdQuery, GetPageRoutesByIdRangeQuery,
    IsPagePathUniqueQuery, SearchPageSummariesQuery,
};

pub struct PageRepository<'a> {
    dispatcher: Dispatcher<'a>,
}

repository_context!(PageRepository);

impl PageRepository<'_> {
    pub fn get_route_by_id(&self, page_id: i64) -> Result<Option<PageRoute>> {
        self.dispatcher.query(GetPageRouteByIdQuery { page_id })
    }

    pub fn get_routes_by_id_range(&self, page_ids: Vec<i64>) -> Result<HashMap<i64, PageRoute>> {
        self.dispatcher.query(GetPageRoutesByIdRangeQuery { page_ids })
    }

    pub fn get_all_routes(&self) -> Result<Vec<PageRoute>> {
        self.dispatcher.query(GetAllPageRoutesQuery)
    }

    pub fn get_details_by_id(&self, page_id: i64) -> Result<Option<PageDetails>> {
        self.dispatcher.query(GetPageDetailsByIdQuery { page_id })
    }

    pub fn get_render_details_by_id(
        &self,
        page_id: i64,
        workflow_status: WorkflowStatusQuery,
    ) -> Result<Option<PageRenderDetails>> {
        self.dispatcher.query(GetPageRenderDetailsByIdQuery {
            page_id,
            workflow_status,
        })
    }

    pub fn get_render_details_by_id_range(
        &self,
        page_ids: Vec<i64>,
        workflow_status: WorkflowStatusQuery,
    ) -> Result<HashMap<i64, PageRenderDetails>> {
        self.dispatcher.query(GetPageRenderDetailsByIdRangeQuery {
            page_ids,
            workflow_status,
        })
    }

    pub fn is_path_unique(&self, query: IsPagePathUniqueQuery) -> Result<bool> {
        self.dispatcher.query(query)
    }

    pub fn search_summaries(
        &self,
        query: SearchPageSummariesQuery,
    ) -> Result<PagedQueryResult<PageSummary>> {
        self.dispatcher.query(query)
    }

    pub fn add(&self, command: AddPageCommand) -> Result<i64> {
        self.dispatcher.command(command)
    }

    pub fn update_url(&self, command: UpdatePageUrlCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn add_draft_version(&self, page_id: i64) -> Result<i64> {
        self.dispatcher.command(AddPageDraftVersionCommand { page_id })
    }

    pub fn update_draft_version(&self, command: UpdatePageDraftVersionCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn delete_draft_version(&self, page_id: i64) -> Result<()> {
        self.dispatcher.command(DeletePageDraftVersionCommand { page_id })
    }

    pub fn publish(&self, page_id: i64) -> Result<()> {
        self.dispatcher.command(PublishPageCommand { page_id })
    }

    pub fn unpublish(&self, page_id: i64) -> Result<()> {
        self.dispatcher.command(UnPublishPageCommand { page_id })
    }

    pub fn delete(&self, page_id: i64) -> Result<()> {
        self.dispatcher.command(DeletePageCommand { page_id })
    }
}
