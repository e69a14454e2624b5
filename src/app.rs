//! Application state management for DiviMate.
//!
//! This module contains the core `App` struct that manages all application
//! state, including UI state, session management, fetched backend data, and
//! background task coordination.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::stream::{self, StreamExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::api::ApiClient;
use crate::auth::{Session, TokenStore};
use crate::config::Config;
use crate::models::{Group, GroupSummary, User};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
/// A full dashboard refresh sends one message per group plus a handful of
/// roster messages; 32 gives comfortable headroom.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum concurrent summary requests during a dashboard refresh.
const MAX_CONCURRENT_REQUESTS: usize = 8;

/// Maximum length for name inputs (user names, group names)
const MAX_NAME_LENGTH: usize = 50;

/// Maximum length for email input
const MAX_EMAIL_LENGTH: usize = 80;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for expense descriptions
const MAX_DESCRIPTION_LENGTH: usize = 80;

/// Maximum length for the expense amount input
const MAX_AMOUNT_LENGTH: usize = 12;

/// Minimum password length accepted by the backend
const MIN_PASSWORD_LENGTH: usize = 6;

// ============================================================================
// UI State Types
// ============================================================================

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Dashboard,
    GroupSummary,
}

impl Screen {
    /// Screens that must never render for an unauthenticated session.
    pub fn requires_auth(&self) -> bool {
        match self {
            Screen::Home => false,
            Screen::Dashboard | Screen::GroupSummary => true,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Home",
            Screen::Dashboard => "Dashboard",
            Screen::GroupSummary => "Group",
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Authenticating,
    CreatingGroup,
    AddingExpense,
    AddingMember,
    RemovingMember,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Which credential flow the auth form is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Register,
}

impl AuthMode {
    pub fn title(&self) -> &'static str {
        match self {
            AuthMode::Login => "Sign In",
            AuthMode::Register => "Create Account",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Auth form focus state. Name and Confirm only exist in register mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFocus {
    Mode,
    Name,
    Email,
    Password,
    Confirm,
    Submit,
}

impl AuthFocus {
    pub fn next(&self, mode: AuthMode) -> Self {
        match (mode, self) {
            (AuthMode::Login, AuthFocus::Mode) => AuthFocus::Email,
            (AuthMode::Login, AuthFocus::Email) => AuthFocus::Password,
            (AuthMode::Login, AuthFocus::Password) => AuthFocus::Submit,
            (AuthMode::Login, _) => AuthFocus::Mode,
            (AuthMode::Register, AuthFocus::Mode) => AuthFocus::Name,
            (AuthMode::Register, AuthFocus::Name) => AuthFocus::Email,
            (AuthMode::Register, AuthFocus::Email) => AuthFocus::Password,
            (AuthMode::Register, AuthFocus::Password) => AuthFocus::Confirm,
            (AuthMode::Register, AuthFocus::Confirm) => AuthFocus::Submit,
            (AuthMode::Register, AuthFocus::Submit) => AuthFocus::Mode,
        }
    }

    pub fn prev(&self, mode: AuthMode) -> Self {
        match (mode, self) {
            (AuthMode::Login, AuthFocus::Mode) => AuthFocus::Submit,
            (AuthMode::Login, AuthFocus::Email) => AuthFocus::Mode,
            (AuthMode::Login, AuthFocus::Password) => AuthFocus::Email,
            (AuthMode::Login, _) => AuthFocus::Password,
            (AuthMode::Register, AuthFocus::Mode) => AuthFocus::Submit,
            (AuthMode::Register, AuthFocus::Name) => AuthFocus::Mode,
            (AuthMode::Register, AuthFocus::Email) => AuthFocus::Name,
            (AuthMode::Register, AuthFocus::Password) => AuthFocus::Email,
            (AuthMode::Register, AuthFocus::Confirm) => AuthFocus::Password,
            (AuthMode::Register, AuthFocus::Submit) => AuthFocus::Confirm,
        }
    }
}

/// Focus within the create-group dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFocus {
    Name,
    Members,
}

impl GroupFocus {
    pub fn toggled(&self) -> Self {
        match self {
            GroupFocus::Name => GroupFocus::Members,
            GroupFocus::Members => GroupFocus::Name,
        }
    }
}

/// Focus within the add-expense dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseFocus {
    Description,
    Amount,
    Payer,
}

impl ExpenseFocus {
    pub fn next(&self) -> Self {
        match self {
            ExpenseFocus::Description => ExpenseFocus::Amount,
            ExpenseFocus::Amount => ExpenseFocus::Payer,
            ExpenseFocus::Payer => ExpenseFocus::Description,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ExpenseFocus::Description => ExpenseFocus::Payer,
            ExpenseFocus::Amount => ExpenseFocus::Description,
            ExpenseFocus::Payer => ExpenseFocus::Amount,
        }
    }
}

// ============================================================================
// Dashboard Statistics
// ============================================================================

/// Aggregate figures shown on the dashboard header cards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_groups: usize,
    pub total_expenses: f64,
    pub total_owed: f64,
}

/// Aggregate group summaries into dashboard figures for one user.
///
/// `total_owed` sums only the groups where the user's balance is
/// negative; credits in other groups do not offset debts.
pub fn compute_stats(user_id: i64, summaries: &[GroupSummary]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_groups: summaries.len(),
        ..Default::default()
    };
    for summary in summaries {
        stats.total_expenses += summary.total_expense;
        if let Some(member) = summary.member(user_id) {
            if member.owes_group() {
                stats.total_owed += -member.balance;
            }
        }
    }
    stats
}

// ============================================================================
// Input Validation
// ============================================================================

/// Whether a character may be appended to a text input of the given
/// current length. Control characters are always rejected.
pub fn can_add_text_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && !c.is_control()
}

/// Loose email shape check: something before the `@`, and a dot in the
/// domain part. The backend does the authoritative validation.
pub fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Validate the auth form before any network call is made.
pub fn validate_auth_form(
    mode: AuthMode,
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), String> {
    if mode == AuthMode::Register && name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if !is_valid_email(email.trim()) {
        return Err("Enter a valid email address".to_string());
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        ));
    }
    if mode == AuthMode::Register && password != confirm {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

/// Whether navigation state demands the login flow: a gated screen with
/// no authenticated session, once the stored session is resolved and no
/// overlay is already open.
pub fn should_open_login(
    screen: Screen,
    state: AppState,
    loading: bool,
    authenticated: bool,
) -> bool {
    screen.requires_auth() && !authenticated && !loading && state == AppState::Normal
}

/// Parse an expense amount from user input.
pub fn parse_amount(input: &str) -> Result<f64, String> {
    match input.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Ok(amount),
        Ok(_) => Err("Amount must be greater than zero".to_string()),
        Err(_) => Err("Enter a numeric amount".to_string()),
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Result types from background fetch tasks.
///
/// These variants are sent through an MPSC channel from spawned fetch tasks
/// back to the main application loop.
enum FetchResult {
    /// Groups the signed-in user belongs to
    Groups(Vec<Group>),
    /// The full user directory, used by member pickers
    Users(Vec<User>),
    /// Balance sheet for a single group (group_id, summary)
    Summary(i64, GroupSummary),
    /// Aggregates computed after all summaries arrived
    Stats(DashboardStats),
    /// An error occurred during a fetch
    Error(String),
}

// ============================================================================
// Main Application Struct
// ============================================================================

/// Main application state container
pub struct App {
    // Core services
    pub config: Config,
    pub session: Session<ApiClient>,
    pub api: ApiClient,

    // UI state
    pub state: AppState,
    pub screen: Screen,
    pub group_selection: usize,
    pub selected_group_id: Option<i64>,

    // Auth form state
    pub auth_mode: AuthMode,
    pub auth_focus: AuthFocus,
    pub auth_name: String,
    pub auth_email: String,
    pub auth_password: String,
    pub auth_confirm: String,
    pub auth_error: Option<String>,
    pub auth_in_flight: bool,

    // Dialog form state
    pub group_focus: GroupFocus,
    pub group_name_input: String,
    pub member_cursor: usize,
    pub member_selected: Vec<i64>,
    pub expense_focus: ExpenseFocus,
    pub expense_description: String,
    pub expense_amount: String,
    pub payer_cursor: usize,
    pub form_error: Option<String>,

    // Backend data
    pub groups: Vec<Group>,
    pub users: Vec<User>,
    pub summaries: HashMap<i64, GroupSummary>,
    pub stats: DashboardStats,
    pub refreshing: bool,

    // Background task channel
    fetch_rx: mpsc::Receiver<FetchResult>,
    fetch_tx: mpsc::Sender<FetchResult>,

    // Status message
    pub status_message: Option<String>,
}

impl App {
    /// Create a new application instance against the given backend URL.
    pub fn new(config: Config, api_url: &str) -> Result<Self> {
        let api = ApiClient::new(api_url)?;

        let store = TokenStore::new(Config::data_dir()?);
        let session = Session::new(api.clone(), store);

        let (fetch_tx, fetch_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let auth_email = config.last_email.clone().unwrap_or_default();

        Ok(Self {
            config,
            session,
            api,
            state: AppState::Normal,
            screen: Screen::Home,
            group_selection: 0,
            selected_group_id: None,
            auth_mode: AuthMode::Login,
            auth_focus: AuthFocus::Email,
            auth_name: String::new(),
            auth_email,
            auth_password: String::new(),
            auth_confirm: String::new(),
            auth_error: None,
            auth_in_flight: false,
            group_focus: GroupFocus::Name,
            group_name_input: String::new(),
            member_cursor: 0,
            member_selected: Vec::new(),
            expense_focus: ExpenseFocus::Description,
            expense_description: String::new(),
            expense_amount: String::new(),
            payer_cursor: 0,
            form_error: None,
            groups: Vec::new(),
            users: Vec::new(),
            summaries: HashMap::new(),
            stats: DashboardStats::default(),
            refreshing: false,
            fetch_rx,
            fetch_tx,
            status_message: None,
        })
    }

    // =========================================================================
    // Session Lifecycle
    // =========================================================================

    /// Resolve the stored session once at startup. Lands on the dashboard
    /// when a live token exists, otherwise on the home screen.
    pub fn initialize_session(&mut self) {
        self.session.initialize();

        if self.session.is_authenticated() {
            if let Some(token) = self.session.current_token() {
                self.api.set_token(token);
            }
            self.screen = Screen::Dashboard;
            self.refresh_dashboard();
        }
    }

    /// Redirect gated screens to the login flow. Runs every loop tick;
    /// the render pass independently refuses to draw gated content, this
    /// makes the redirect land the user in the auth form rather than on
    /// a bare home screen.
    pub fn enforce_auth_gate(&mut self) {
        if should_open_login(
            self.screen,
            self.state,
            self.session.is_loading(),
            self.session.is_authenticated(),
        ) {
            self.screen = Screen::Home;
            self.start_auth(AuthMode::Login);
        }
    }

    /// Open the auth overlay in the given mode.
    pub fn start_auth(&mut self, mode: AuthMode) {
        self.state = AppState::Authenticating;
        self.auth_mode = mode;
        self.auth_error = None;
        self.auth_focus = match mode {
            AuthMode::Register => AuthFocus::Name,
            AuthMode::Login if self.auth_email.is_empty() => AuthFocus::Email,
            AuthMode::Login => AuthFocus::Password,
        };
    }

    /// Flip the auth overlay between login and register, keeping the email.
    pub fn toggle_auth_mode(&mut self) {
        self.auth_mode = self.auth_mode.toggled();
        self.auth_error = None;
        self.auth_password.clear();
        self.auth_confirm.clear();
    }

    /// Submit the auth form.
    ///
    /// The exchange is awaited inline, so a second submission cannot start
    /// while one is in flight; `auth_in_flight` only exists so the render
    /// pass can label the button.
    pub async fn attempt_auth_submit(&mut self) {
        if let Err(msg) = validate_auth_form(
            self.auth_mode,
            &self.auth_name,
            &self.auth_email,
            &self.auth_password,
            &self.auth_confirm,
        ) {
            self.auth_error = Some(msg);
            return;
        }

        self.auth_error = None;
        self.auth_in_flight = true;

        let email = self.auth_email.trim().to_string();
        let result = match self.auth_mode {
            AuthMode::Login => self.session.login(&email, &self.auth_password).await,
            AuthMode::Register => {
                self.session
                    .register(self.auth_name.trim(), &email, &self.auth_password)
                    .await
            }
        };
        self.auth_in_flight = false;

        if result.success {
            self.config.last_email = Some(email);
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }

            if let Some(token) = self.session.current_token() {
                self.api.set_token(token);
            }

            self.auth_name.clear();
            self.auth_password.clear();
            self.auth_confirm.clear();
            self.state = AppState::Normal;
            self.screen = Screen::Dashboard;
            info!("Authentication successful");
            self.refresh_dashboard();
        } else {
            self.auth_error = result.error;
        }
    }

    /// Sign out and drop everything tied to the old session.
    pub async fn logout(&mut self) {
        self.session.logout().await;

        self.api.clear_token();
        self.groups.clear();
        self.users.clear();
        self.summaries.clear();
        self.stats = DashboardStats::default();
        self.group_selection = 0;
        self.selected_group_id = None;
        self.screen = Screen::Home;
        self.state = AppState::Normal;
        self.status_message = Some("Signed out".to_string());
    }

    // =========================================================================
    // Background Data Refresh
    // =========================================================================

    /// Spawn a background task that refreshes groups, the user directory,
    /// every group summary, and the dashboard aggregates.
    pub fn refresh_dashboard(&mut self) {
        let user_id = match self.session.user() {
            Some(user) => user.id,
            None => {
                warn!("Refresh requested without an authenticated session");
                return;
            }
        };

        let api = Arc::new(self.api.clone());
        let tx = self.fetch_tx.clone();
        self.refreshing = true;

        tokio::spawn(async move {
            Self::execute_dashboard_refresh(tx, api, user_id).await;
        });
    }

    /// Helper to send fetch results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<FetchResult>, result: FetchResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send fetch result - channel closed");
        }
    }

    async fn execute_dashboard_refresh(
        tx: mpsc::Sender<FetchResult>,
        api: Arc<ApiClient>,
        user_id: i64,
    ) {
        match api.fetch_users().await {
            Ok(users) => Self::send_result(&tx, FetchResult::Users(users)).await,
            Err(e) => Self::send_result(&tx, FetchResult::Error(e.user_message())).await,
        }

        let groups = match api.fetch_groups(user_id).await {
            Ok(groups) => groups,
            Err(e) => {
                Self::send_result(&tx, FetchResult::Error(e.user_message())).await;
                Self::send_result(&tx, FetchResult::Stats(DashboardStats::default())).await;
                return;
            }
        };
        let group_ids: Vec<i64> = groups.iter().map(|g| g.id).collect();
        Self::send_result(&tx, FetchResult::Groups(groups)).await;

        let summaries: Vec<GroupSummary> = stream::iter(group_ids)
            .map(|group_id| {
                let api = Arc::clone(&api);
                let tx = tx.clone();
                async move {
                    match api.fetch_group_summary(group_id).await {
                        Ok(summary) => {
                            Self::send_result(&tx, FetchResult::Summary(group_id, summary.clone()))
                                .await;
                            Some(summary)
                        }
                        Err(e) => {
                            warn!(group_id, error = %e, "Failed to fetch group summary");
                            Self::send_result(&tx, FetchResult::Error(e.user_message())).await;
                            None
                        }
                    }
                }
            })
            .buffer_unordered(MAX_CONCURRENT_REQUESTS)
            .filter_map(|s| async move { s })
            .collect()
            .await;

        Self::send_result(&tx, FetchResult::Stats(compute_stats(user_id, &summaries))).await;
    }

    /// Refetch a single group's summary after a mutation.
    pub fn refresh_group(&mut self, group_id: i64) {
        let api = self.api.clone();
        let tx = self.fetch_tx.clone();

        tokio::spawn(async move {
            match api.fetch_group_summary(group_id).await {
                Ok(summary) => {
                    Self::send_result(&tx, FetchResult::Summary(group_id, summary)).await
                }
                Err(e) => Self::send_result(&tx, FetchResult::Error(e.user_message())).await,
            }
        });
    }

    /// Drain the fetch channel and fold results into app state.
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.fetch_rx.try_recv() {
            results.push(result);
        }
        for result in results {
            self.process_fetch_result(result);
        }
    }

    fn process_fetch_result(&mut self, result: FetchResult) {
        match result {
            FetchResult::Groups(groups) => {
                if self.group_selection >= groups.len() {
                    self.group_selection = groups.len().saturating_sub(1);
                }
                self.groups = groups;
            }
            FetchResult::Users(users) => {
                self.users = users;
            }
            FetchResult::Summary(group_id, summary) => {
                self.summaries.insert(group_id, summary);
            }
            FetchResult::Stats(stats) => {
                self.stats = stats;
                self.refreshing = false;
            }
            FetchResult::Error(message) => {
                self.status_message = Some(message);
                self.refreshing = false;
            }
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn select_next_group(&mut self) {
        if !self.groups.is_empty() {
            self.group_selection = (self.group_selection + 1) % self.groups.len();
        }
    }

    pub fn select_prev_group(&mut self) {
        if !self.groups.is_empty() {
            self.group_selection =
                (self.group_selection + self.groups.len() - 1) % self.groups.len();
        }
    }

    /// Open the balance sheet for the currently selected group.
    pub fn open_selected_group(&mut self) {
        if let Some(group) = self.groups.get(self.group_selection) {
            self.selected_group_id = Some(group.id);
            self.screen = Screen::GroupSummary;
            self.refresh_group(group.id);
        }
    }

    pub fn close_group(&mut self) {
        self.selected_group_id = None;
        self.screen = Screen::Dashboard;
    }

    pub fn selected_group(&self) -> Option<&Group> {
        let id = self.selected_group_id?;
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn selected_summary(&self) -> Option<&GroupSummary> {
        self.summaries.get(&self.selected_group_id?)
    }

    // =========================================================================
    // Group / Expense Dialogs
    // =========================================================================

    /// Open the create-group dialog.
    pub fn start_create_group(&mut self) {
        self.state = AppState::CreatingGroup;
        self.group_focus = GroupFocus::Name;
        self.group_name_input.clear();
        self.member_cursor = 0;
        self.member_selected.clear();
        self.form_error = None;
        // The creator is always a member of their own group.
        if let Some(user) = self.session.user() {
            self.member_selected.push(user.id);
        }
    }

    pub fn toggle_member_at_cursor(&mut self) {
        let Some(user) = self.users.get(self.member_cursor) else {
            return;
        };
        // The creator cannot be deselected.
        if Some(user.id) == self.session.user().map(|u| u.id) {
            return;
        }
        if let Some(pos) = self.member_selected.iter().position(|&id| id == user.id) {
            self.member_selected.remove(pos);
        } else {
            self.member_selected.push(user.id);
        }
    }

    pub async fn submit_create_group(&mut self) {
        let name = self.group_name_input.trim().to_string();
        if name.is_empty() {
            self.form_error = Some("Group name is required".to_string());
            return;
        }
        if self.member_selected.is_empty() {
            self.form_error = Some("Select at least one member".to_string());
            return;
        }

        match self.api.create_group(&name, &self.member_selected).await {
            Ok(()) => {
                info!(group = %name, "Group created");
                self.state = AppState::Normal;
                self.status_message = Some(format!("Created group \"{}\"", name));
                self.refresh_dashboard();
            }
            Err(e) => {
                self.form_error = Some(e.user_message());
            }
        }
    }

    /// Open the add-expense dialog for the current group.
    pub fn start_add_expense(&mut self) {
        if self.selected_group_id.is_none() {
            return;
        }
        self.state = AppState::AddingExpense;
        self.expense_focus = ExpenseFocus::Description;
        self.expense_description.clear();
        self.expense_amount.clear();
        self.form_error = None;
        // Default the payer to the signed-in user when they are a member.
        self.payer_cursor = self
            .session
            .user()
            .and_then(|user| {
                self.selected_summary()?
                    .members
                    .iter()
                    .position(|m| m.id == user.id)
            })
            .unwrap_or(0);
    }

    pub async fn submit_add_expense(&mut self) {
        let Some(group_id) = self.selected_group_id else {
            return;
        };

        let description = self.expense_description.trim().to_string();
        if description.is_empty() {
            self.form_error = Some("Description is required".to_string());
            return;
        }
        let amount = match parse_amount(&self.expense_amount) {
            Ok(amount) => amount,
            Err(msg) => {
                self.form_error = Some(msg);
                return;
            }
        };
        let Some(payer_id) = self
            .selected_summary()
            .and_then(|s| s.members.get(self.payer_cursor))
            .map(|m| m.id)
        else {
            self.form_error = Some("Select who paid".to_string());
            return;
        };

        match self
            .api
            .add_expense(group_id, &description, amount, payer_id)
            .await
        {
            Ok(()) => {
                info!(group_id, amount, "Expense recorded");
                self.state = AppState::Normal;
                self.status_message = Some("Expense added".to_string());
                self.refresh_group(group_id);
            }
            Err(e) => {
                self.form_error = Some(e.user_message());
            }
        }
    }

    /// Users eligible to be added to the current group.
    pub fn addable_users(&self) -> Vec<&User> {
        let member_ids: Vec<i64> = self
            .selected_summary()
            .map(|s| s.members.iter().map(|m| m.id).collect())
            .unwrap_or_default();
        self.users
            .iter()
            .filter(|u| !member_ids.contains(&u.id))
            .collect()
    }

    pub fn start_add_member(&mut self) {
        if self.selected_group_id.is_none() {
            return;
        }
        self.state = AppState::AddingMember;
        self.member_cursor = 0;
        self.form_error = None;
    }

    pub async fn submit_add_member(&mut self) {
        let Some(group_id) = self.selected_group_id else {
            return;
        };
        let Some(user_id) = self.addable_users().get(self.member_cursor).map(|u| u.id) else {
            self.form_error = Some("No user selected".to_string());
            return;
        };

        match self.api.add_member(group_id, user_id).await {
            Ok(()) => {
                self.state = AppState::Normal;
                self.status_message = Some("Member added".to_string());
                self.refresh_group(group_id);
            }
            Err(e) => {
                self.form_error = Some(e.user_message());
            }
        }
    }

    pub fn start_remove_member(&mut self) {
        if self.selected_summary().is_none() {
            return;
        }
        self.state = AppState::RemovingMember;
        self.member_cursor = 0;
        self.form_error = None;
    }

    pub async fn submit_remove_member(&mut self) {
        let Some(group_id) = self.selected_group_id else {
            return;
        };
        let Some(member) = self
            .selected_summary()
            .and_then(|s| s.members.get(self.member_cursor))
        else {
            self.form_error = Some("No member selected".to_string());
            return;
        };
        let (user_id, name) = (member.id, member.name.clone());

        match self.api.remove_member(group_id, user_id).await {
            Ok(()) => {
                info!(group_id, user_id, "Member removed");
                self.state = AppState::Normal;
                self.status_message = Some(format!("Removed {}", name));
                self.refresh_group(group_id);
            }
            Err(e) => {
                self.form_error = Some(e.user_message());
            }
        }
    }

    /// Cancel whatever dialog is open.
    pub fn cancel_dialog(&mut self) {
        self.state = AppState::Normal;
        self.form_error = None;
    }

    // =========================================================================
    // Input Helpers
    // =========================================================================

    pub fn can_add_name_char(&self, c: char) -> bool {
        can_add_text_char(self.auth_name.chars().count(), MAX_NAME_LENGTH, c)
    }

    pub fn can_add_email_char(&self, c: char) -> bool {
        can_add_text_char(self.auth_email.chars().count(), MAX_EMAIL_LENGTH, c)
    }

    pub fn can_add_password_char(&self, c: char) -> bool {
        can_add_text_char(self.auth_password.chars().count(), MAX_PASSWORD_LENGTH, c)
    }

    pub fn can_add_group_name_char(&self, c: char) -> bool {
        can_add_text_char(self.group_name_input.chars().count(), MAX_NAME_LENGTH, c)
    }

    pub fn can_add_description_char(&self, c: char) -> bool {
        can_add_text_char(
            self.expense_description.chars().count(),
            MAX_DESCRIPTION_LENGTH,
            c,
        )
    }

    pub fn can_add_amount_char(&self, c: char) -> bool {
        (c.is_ascii_digit() || c == '.')
            && can_add_text_char(self.expense_amount.chars().count(), MAX_AMOUNT_LENGTH, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberBalance;

    fn summary(total: f64, members: Vec<MemberBalance>) -> GroupSummary {
        GroupSummary {
            group: "Trip".to_string(),
            total_expense: total,
            split_per_head: 0.0,
            members,
            transactions: Vec::new(),
        }
    }

    fn member(id: i64, balance: f64) -> MemberBalance {
        MemberBalance {
            id,
            name: format!("user-{}", id),
            paid: 0.0,
            owes: 0.0,
            balance,
        }
    }

    // -------------------------------------------------------------------------
    // Dashboard Stats Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_compute_stats_empty() {
        let stats = compute_stats(1, &[]);
        assert_eq!(stats, DashboardStats::default());
    }

    #[test]
    fn test_compute_stats_sums_expenses_across_groups() {
        let summaries = vec![
            summary(120.0, vec![member(1, 10.0)]),
            summary(80.0, vec![member(1, -5.0)]),
        ];
        let stats = compute_stats(1, &summaries);
        assert_eq!(stats.total_groups, 2);
        assert!((stats.total_expenses - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_stats_only_counts_debts() {
        // Credits in one group do not offset debts in another.
        let summaries = vec![
            summary(100.0, vec![member(1, 40.0)]),
            summary(100.0, vec![member(1, -25.0)]),
            summary(100.0, vec![member(1, -15.0)]),
        ];
        let stats = compute_stats(1, &summaries);
        assert!((stats.total_owed - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_compute_stats_ignores_groups_without_the_user() {
        let summaries = vec![summary(100.0, vec![member(2, -50.0)])];
        let stats = compute_stats(1, &summaries);
        assert_eq!(stats.total_owed, 0.0);
        assert!((stats.total_expenses - 100.0).abs() < 1e-9);
    }

    // -------------------------------------------------------------------------
    // Screen Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_screen_auth_requirements() {
        assert!(!Screen::Home.requires_auth());
        assert!(Screen::Dashboard.requires_auth());
        assert!(Screen::GroupSummary.requires_auth());
    }

    #[test]
    fn test_gated_screen_without_session_opens_login() {
        assert!(should_open_login(
            Screen::Dashboard,
            AppState::Normal,
            false,
            false
        ));
        assert!(should_open_login(
            Screen::GroupSummary,
            AppState::Normal,
            false,
            false
        ));
    }

    #[test]
    fn test_login_redirect_waits_and_yields() {
        // Home never redirects
        assert!(!should_open_login(
            Screen::Home,
            AppState::Normal,
            false,
            false
        ));
        // An authenticated session passes through
        assert!(!should_open_login(
            Screen::Dashboard,
            AppState::Normal,
            false,
            true
        ));
        // No redirect while the stored session is still being resolved
        assert!(!should_open_login(
            Screen::Dashboard,
            AppState::Normal,
            true,
            false
        ));
        // An open overlay (including the auth form itself) is left alone
        assert!(!should_open_login(
            Screen::Dashboard,
            AppState::Authenticating,
            false,
            false
        ));
    }

    // -------------------------------------------------------------------------
    // Auth Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_auth_focus_cycle_login() {
        let mut focus = AuthFocus::Mode;
        let mut seen = Vec::new();
        for _ in 0..4 {
            focus = focus.next(AuthMode::Login);
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                AuthFocus::Email,
                AuthFocus::Password,
                AuthFocus::Submit,
                AuthFocus::Mode,
            ]
        );
    }

    #[test]
    fn test_auth_focus_cycle_register_includes_name_and_confirm() {
        let mut focus = AuthFocus::Mode;
        let mut seen = Vec::new();
        for _ in 0..6 {
            focus = focus.next(AuthMode::Register);
            seen.push(focus);
        }
        assert_eq!(
            seen,
            vec![
                AuthFocus::Name,
                AuthFocus::Email,
                AuthFocus::Password,
                AuthFocus::Confirm,
                AuthFocus::Submit,
                AuthFocus::Mode,
            ]
        );
    }

    #[test]
    fn test_auth_focus_prev_inverts_next() {
        let login_cycle = [
            AuthFocus::Mode,
            AuthFocus::Email,
            AuthFocus::Password,
            AuthFocus::Submit,
        ];
        for focus in login_cycle {
            assert_eq!(focus.next(AuthMode::Login).prev(AuthMode::Login), focus);
        }

        let register_cycle = [
            AuthFocus::Mode,
            AuthFocus::Name,
            AuthFocus::Email,
            AuthFocus::Password,
            AuthFocus::Confirm,
            AuthFocus::Submit,
        ];
        for focus in register_cycle {
            assert_eq!(
                focus.next(AuthMode::Register).prev(AuthMode::Register),
                focus
            );
        }
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_text_char() {
        assert!(can_add_text_char(0, 10, 'a'));
        assert!(can_add_text_char(9, 10, 'z'));
        assert!(!can_add_text_char(10, 10, 'a'));
        assert!(!can_add_text_char(0, 10, '\x00'));
        assert!(!can_add_text_char(0, 10, '\n'));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@nodot"));
        assert!(!is_valid_email("asha@.com"));
        assert!(!is_valid_email("asha@example."));
    }

    #[test]
    fn test_validate_auth_form_login() {
        assert!(validate_auth_form(AuthMode::Login, "", "a@b.co", "secret1", "").is_ok());
        assert!(validate_auth_form(AuthMode::Login, "", "bad-email", "secret1", "").is_err());
        assert!(validate_auth_form(AuthMode::Login, "", "a@b.co", "short", "").is_err());
    }

    #[test]
    fn test_validate_auth_form_register() {
        assert!(
            validate_auth_form(AuthMode::Register, "Asha", "a@b.co", "secret1", "secret1").is_ok()
        );
        assert!(validate_auth_form(AuthMode::Register, "", "a@b.co", "secret1", "secret1").is_err());
        assert!(
            validate_auth_form(AuthMode::Register, "Asha", "a@b.co", "secret1", "different")
                .is_err()
        );
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("12.50"), Ok(12.5));
        assert_eq!(parse_amount(" 100 "), Ok(100.0));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
