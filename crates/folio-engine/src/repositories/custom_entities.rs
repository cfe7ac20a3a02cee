use std::collections::HashMap;

use folio_core::model::{
    CustomEntityDefinitionMicroSummary, CustomEntityDetails, CustomEntityRenderSummary,
    CustomEntityRoute, CustomEntitySummary, CustomEntityVersionSummary, PagedQueryResult,
    RootEntityMicroSummary, WorkflowStatusQuery,
};
use folio_core::routing::RoutingRuleSummary;
use folio_store::errors::Result;

use super::{repository_context, Dispatcher};
use crate::commands::custom_entities::{
    AddCustomEntityCommand, AddCustomEntityDraftVersionCommand, DeleteCustomEntityCommand,
    DeleteCustomEntityDraftVersionCommand, EnsureCustomEntityDefinitionExistsCommand,
    PublishCustomEntityCommand, ReOrderCustomEntitiesCommand, UnPublishCustomEntityCommand,
    UpdateCustomEntityDraftVersionCommand, UpdateCustomEntityOrderingPositionCommand,
    UpdateCustomEntityUrlCommand,
};
use crate::queries::custom_entities::{
    GetAllCustomEntityDefinitionMicroSummariesQuery, GetAllCustomEntityRoutingRulesQuery,
    GetCustomEntityDefinitionMicroSummaryByIdQuery, GetCustomEntityDetailsByIdQuery,
    GetCustomEntityMicroSummariesByIdRangeQuery, GetCustomEntityRenderSummariesByDefinitionCodeQuery,
    GetCustomEntityRenderSummariesByIdRangeQuery, GetCustomEntityRenderSummaryByIdQuery,
    GetCustomEntityRouteByPathQuery, GetCustomEntityRoutesByDefinitionCodeQuery,
    GetCustomEntityRoutingRuleByRouteFormatQuery,
    GetCustomEntityVersionSummariesByCustomEntityIdQuery, IsCustomEntityPathUniqueQuery,
    SearchCustomEntityRenderSummariesQuery, SearchCustomEntitySummariesQuery,
};

pub struct CustomEntityRepository<'a> {
    dispatcher: Dispatcher<'a>,
}

repository_context!(CustomEntityRepository);

impl CustomEntityRepository<'_> {
    pub fn get_all_definition_micro_summaries(
        &self,
    ) -> Result<Vec<CustomEntityDefinitionMicroSummary>> {
        self.dispatcher
            .query(GetAllCustomEntityDefinitionMicroSummariesQuery)
    }

    pub fn get_definition_micro_summary_by_id(
        &self,
        definition_code: &str,
    ) -> Result<Option<CustomEntityDefinitionMicroSummary>> {
        self.dispatcher
            .query(GetCustomEntityDefinitionMicroSummaryByIdQuery {
                definition_code: definition_code.to_string(),
            })
    }

    pub fn get_all_routing_rules(&self) -> Result<Vec<RoutingRuleSummary>> {
        self.dispatcher.query(GetAllCustomEntityRoutingRulesQuery)
    }

    pub fn get_routing_rule_by_route_format(
        &self,
        route_format: &str,
    ) -> Result<Option<RoutingRuleSummary>> {
        self.dispatcher
            .query(GetCustomEntityRoutingRuleByRouteFormatQuery {
                route_format: route_format.to_string(),
            })
    }

    pub fn get_routes_by_definition_code(
        &self,
        definition_code: &str,
    ) -> Result<Vec<CustomEntityRoute>> {
        self.dispatcher
            .query(GetCustomEntityRoutesByDefinitionCodeQuery {
                definition_code: definition_code.to_string(),
            })
    }

    pub fn get_route_by_path(
        &self,
        query: GetCustomEntityRouteByPathQuery,
    ) -> Result<Option<CustomEntityRoute>> {
        self.dispatcher.query(query)
    }

    pub fn get_details_by_id(&self, custom_entity_id: i64) -> Result<Option<CustomEntityDetails>> {
        self.dispatcher
            .query(GetCustomEntityDetailsByIdQuery { custom_entity_id })
    }

    pub fn get_render_summary_by_id(
        &self,
        custom_entity_id: i64,
        workflow_status: WorkflowStatusQuery,
    ) -> Result<Option<CustomEntityRenderSummary>> {
        self.dispatcher.query(GetCustomEntityRenderSummaryByIdQuery {
            custom_entity_id,
            workflow_status,
        })
    }

    pub fn get_render_summaries_by_id_range(
        &self,
        custom_entity_ids: Vec<i64>,
        workflow_status: WorkflowStatusQuery,
    ) -> Result<HashMap<i64, CustomEntityRenderSummary>> {
        self.dispatcher
            .query(GetCustomEntityRenderSummariesByIdRangeQuery {
                custom_entity_ids,
                workflow_status,
            })
    }

    pub fn get_render_summaries_by_definition_code(
        &self,
        definition_code: &str,
        workflow_status: WorkflowStatusQuery,
    ) -> Result<Vec<CustomEntityRenderSummary>> {
        self.dispatcher
            .query(GetCustomEntityRenderSummariesByDefinitionCodeQuery {
                definition_code: definition_code.to_string(),
                workflow_status,
            })
    }

    pub fn get_version_summaries(
        &self,
        custom_entity_id: i64,
    ) -> Result<Vec<CustomEntityVersionSummary>> {
        self.dispatcher
            .query(GetCustomEntityVersionSummariesByCustomEntityIdQuery { custom_entity_id })
    }

    pub fn is_path_unique(&self, query: IsCustomEntityPathUniqueQuery) -> Result<bool> {
        self.dispatcher.query(query)
    }

    pub fn search_summaries(
        &self,
        query: SearchCustomEntitySummariesQuery,
    ) -> Result<PagedQueryResult<CustomEntitySummary>> {
        self.dispatcher.query(query)
    }

    pub fn search_render_summaries(
        &self,
        query: SearchCustomEntityRenderSummariesQuery,
    ) -> Result<PagedQueryResult<CustomEntityRenderSummary>> {
        self.dispatcher.query(query)
    }

    pub fn get_micro_summaries_by_id_range(
        &self,
        custom_entity_ids: Vec<i64>,
    ) -> Result<HashMap<i64, RootEntityMicroSummary>> {
        self.dispatcher
            .query(GetCustomEntityMicroSummariesByIdRangeQuery { custom_entity_ids })
    }

    pub fn ensure_definition_exists(&self, definition_code: &str) -> Result<()> {
        self.dispatcher
            .command(EnsureCustomEntityDefinitionExistsCommand {
                definition_code: definition_code.to_string(),
            })
    }

    pub fn add(&self, command: AddCustomEntityCommand) -> Result<i64> {
        self.dispatcher.command(command)
    }

    pub fn add_draft_version(&self, custom_entity_id: i64) -> Result<i64> {
        self.dispatcher
            .command(AddCustomEntityDraftVersionCommand { custom_entity_id })
    }

    pub fn update_draft_version(&self, command: UpdateCustomEntityDraftVersionCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn delete_draft_version(&self, custom_entity_id: i64) -> Result<()> {
        self.dispatcher
            .command(DeleteCustomEntityDraftVersionCommand { custom_entity_id })
    }

    pub fn publish(&self, custom_entity_id: i64) -> Result<()> {
        self.dispatcher
            .command(PublishCustomEntityCommand { custom_entity_id })
    }

    pub fn unpublish(&self, custom_entity_id: i64) -> Result<()> {
        self.dispatcher
            .command(UnPublishCustomEntityCommand { custom_entity_id })
    }

    pub fn update_url(&self, command: UpdateCustomEntityUrlCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn update_ordering_position(
        &self,
        command: UpdateCustomEntityOrderingPositionCommand,
    ) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn reorder(&self, command: ReOrderCustomEntitiesCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn delete(&self, custom_entity_id: i64) -> Result<()> {
        self.dispatcher
            .command(DeleteCustomEntityCommand { custom_entity_id })
    }
}
