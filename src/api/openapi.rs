use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::agent::{ActionSchedule, AgentAction, AgentReply};
use crate::dashboard::{
    ActivityItem, ContactTransferSummary, DashboardSummary, NetFlow, StakeSummary, TimelinePoint,
};
use crate::database::enums::{TaskStatus, TriggerKind};
use crate::database::models::{Contact, Message, ScheduledTask, StakeAccount, Transaction};

use super::responses::*;
use super::{
    agent_handlers, auth_handlers, contact_handlers, dashboard_handlers, routes, stake_handlers,
    task_handlers, transaction_handlers,
};

/// Registers the bearer scheme referenced by the authenticated paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Agent API",
        version = "1.0.0",
        description = "Wallet assistant backend: auth, contacts, transactions, stakes, an AI intent agent, and a scheduled-task trigger engine with live SSE notifications",
        license(name = "MIT")
    ),
    paths(
        routes::health_check,
        auth_handlers::signup,
        auth_handlers::signin,
        auth_handlers::me,
        contact_handlers::create_contact,
        contact_handlers::list_contacts,
        contact_handlers::search_contacts,
        contact_handlers::delete_contact,
        transaction_handlers::create_transaction,
        transaction_handlers::list_transactions,
        stake_handlers::create_stake,
        stake_handlers::list_stakes,
        stake_handlers::stake_status,
        task_handlers::create_task,
        task_handlers::list_tasks,
        task_handlers::cancel_task,
        task_handlers::dismiss_task,
        dashboard_handlers::get_dashboard,
        agent_handlers::post_message,
        agent_handlers::get_history,
    ),
    components(
        schemas(
            ErrorResponse,
            SuccessResponse,
            SignupRequest,
            SigninRequest,
            UserResponse,
            AuthResponse,
            Contact,
            CreateContactRequest,
            Transaction,
            CreateTransactionRequest,
            StakeAccount,
            CreateStakeRequest,
            StakeStatusResponse,
            StakeActivationResponse,
            ScheduledTask,
            CreateTaskRequest,
            TaskStatus,
            TriggerKind,
            DashboardSummary,
            NetFlow,
            StakeSummary,
            ContactTransferSummary,
            TimelinePoint,
            ActivityItem,
            AgentMessageRequest,
            AgentReply,
            AgentAction,
            ActionSchedule,
            Message,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Account creation and sign-in"),
        (name = "Contacts", description = "Address book"),
        (name = "Transactions", description = "Client-signed transaction log"),
        (name = "Stakes", description = "Stake accounts with live activation state"),
        (name = "Scheduled Tasks", description = "Conditional deferred actions"),
        (name = "Dashboard", description = "Aggregated activity view"),
        (name = "Agent", description = "Natural-language intent parsing"),
    )
)]
pub struct ApiDoc;
