use std::time::{Duration, Instant};

use chrono::Utc;

use crate::api::CsvExport;
use crate::config::Config;
use crate::controllers::auth::AuthOutcome;
use crate::controllers::messages::MessageField;
use crate::controllers::withdrawals::{NoteField, MISSING_ID};
use crate::controllers::{
    AuthController, HomeController, MessagesController, Outbox, ReferralsController, UsersController,
    WithdrawalsController,
};
use crate::error::ApiError;
use crate::normalize::{ReferralFocus, WithdrawalStatus};
use crate::session::AdminSession;
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use crate::types::{AppEvent, Command, Outcome, Request, RequestKind};
use crate::util::copy_feedback::{copy_key, CopyFeedback};

const TOAST_DURATION: Duration = Duration::from_secs(2);
const MAX_LOG_ENTRIES: usize = 50;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Signup,
    Login,
    Dashboard,
}

/// Sidebar entries. Only the first five are wired up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tab {
    Home,
    Messages,
    Users,
    Referrals,
    Withdrawals,
    Inventory,
    Orders,
    Pricing,
    Reports,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 10] = [
        Tab::Home,
        Tab::Messages,
        Tab::Users,
        Tab::Referrals,
        Tab::Withdrawals,
        Tab::Inventory,
        Tab::Orders,
        Tab::Pricing,
        Tab::Reports,
        Tab::Settings,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Messages => "Messages",
            Tab::Users => "Users",
            Tab::Referrals => "Referrals",
            Tab::Withdrawals => "Withdrawals",
            Tab::Inventory => "Inventory",
            Tab::Orders => "Orders",
            Tab::Pricing => "Pricing",
            Tab::Reports => "Reports",
            Tab::Settings => "Settings",
        }
    }

    pub fn enabled(&self) -> bool {
        matches!(self, Tab::Home | Tab::Messages | Tab::Users | Tab::Referrals | Tab::Withdrawals)
    }
}

/// A text input the keyboard is currently typing into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    LoginEmail,
    LoginPassword,
    SignupName,
    SignupEmail,
    SignupPassword,
    SignupConfirm,
    UsersSearch,
    ReferralSearch,
    WithdrawalUser,
    Note(NoteField),
    Message(MessageField),
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::LoginEmail | Field::SignupEmail => "Email",
            Field::LoginPassword | Field::SignupPassword => "Password",
            Field::SignupName => "Name",
            Field::SignupConfirm => "Confirm password",
            Field::UsersSearch => "Search users",
            Field::ReferralSearch => "Find user",
            Field::WithdrawalUser => "User ID",
            Field::Note(NoteField::PaymentRef) => "Payment ref",
            Field::Note(NoteField::AdminNote) => "Admin note",
            Field::Message(f) => f.label(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, Field::LoginPassword | Field::SignupPassword | Field::SignupConfirm)
    }
}

const LOGIN_FIELDS: [Field; 2] = [Field::LoginEmail, Field::LoginPassword];
const SIGNUP_FIELDS: [Field; 4] = [Field::SignupName, Field::SignupEmail, Field::SignupPassword, Field::SignupConfirm];

/// Which list the arrow keys drive on the referrals tab.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ReferralPane {
    #[default]
    Search,
    Tree,
    NonPaid,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CopyField {
    AccountNumber,
    Ifsc,
    Upi,
}

impl CopyField {
    pub fn key(&self) -> &'static str {
        match self {
            CopyField::AccountNumber => "account",
            CopyField::Ifsc => "ifsc",
            CopyField::Upi => "upi",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CopyField::AccountNumber => "account number",
            CopyField::Ifsc => "IFSC",
            CopyField::Upi => "UPI ID",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

pub struct App {
    quit: bool,
    fps: u32,
    theme: Theme,

    screen: Screen,
    tab: Tab,
    editing: Option<Field>,
    auth_field: usize,
    referral_pane: ReferralPane,
    message_field: usize,
    note_target: Option<String>,

    session: Option<AdminSession>,
    store: Box<dyn KeyValueStore>,
    outbox: Outbox,

    auth: AuthController,
    home: HomeController,
    users: UsersController,
    referrals: ReferralsController,
    withdrawals: WithdrawalsController,
    messages: MessagesController,
    copy_feedback: CopyFeedback,

    // Debug log (Ctrl+D)
    debug_log: Vec<String>,
    debug_visible: bool,

    toast_message: Option<(String, ToastKind, Instant)>,
}

impl App {
    /// Restores a stored session; without one the console opens on signup.
    pub fn new(cfg: &Config, store: Box<dyn KeyValueStore>) -> Self {
        let session = match AdminSession::load(store.as_ref()) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("[app] could not read stored session: {e:#}");
                None
            }
        };
        let screen = if session.is_some() { Screen::Dashboard } else { Screen::Signup };

        let mut app = Self {
            quit: false,
            fps: cfg.render_fps,
            theme: cfg.theme,
            screen,
            tab: Tab::Home,
            editing: None,
            auth_field: 0,
            referral_pane: ReferralPane::default(),
            message_field: 0,
            note_target: None,
            session,
            store,
            outbox: Outbox::default(),
            auth: AuthController::default(),
            home: HomeController::default(),
            users: UsersController::new(cfg.page_size, cfg.debounce),
            referrals: ReferralsController::new(cfg.referral_depth, cfg.debounce),
            withdrawals: WithdrawalsController::new(cfg.debounce),
            messages: MessagesController::default(),
            copy_feedback: CopyFeedback::default(),
            debug_log: Vec::new(),
            debug_visible: false,
            toast_message: None,
        };
        if app.screen == Screen::Dashboard {
            app.activate_tab();
        } else {
            app.editing = Some(app.auth_fields()[0]);
        }
        app
    }

    // ----- getters -----
    pub fn fps(&self) -> u32 {
        self.fps
    }
    pub fn quit_flag(&self) -> bool {
        self.quit
    }
    pub fn theme(&self) -> Theme {
        self.theme
    }
    pub fn screen(&self) -> Screen {
        self.screen
    }
    pub fn tab(&self) -> Tab {
        self.tab
    }
    pub fn editing(&self) -> Option<Field> {
        self.editing
    }
    pub fn referral_pane(&self) -> ReferralPane {
        self.referral_pane
    }
    pub fn message_field(&self) -> MessageField {
        let fields = self.messages.fields();
        fields[self.message_field.min(fields.len() - 1)]
    }
    pub fn session(&self) -> Option<&AdminSession> {
        self.session.as_ref()
    }
    pub fn auth(&self) -> &AuthController {
        &self.auth
    }
    pub fn home(&self) -> &HomeController {
        &self.home
    }
    pub fn users(&self) -> &UsersController {
        &self.users
    }
    pub fn referrals(&self) -> &ReferralsController {
        &self.referrals
    }
    pub fn withdrawals(&self) -> &WithdrawalsController {
        &self.withdrawals
    }
    pub fn messages(&self) -> &MessagesController {
        &self.messages
    }
    pub fn debug_log(&self) -> &[String] {
        &self.debug_log
    }
    pub fn debug_visible(&self) -> bool {
        self.debug_visible
    }

    pub fn auth_fields(&self) -> &'static [Field] {
        match self.screen {
            Screen::Signup => &SIGNUP_FIELDS,
            _ => &LOGIN_FIELDS,
        }
    }

    /// Current text of a field, as typed.
    pub fn field_text(&self, field: Field) -> &str {
        match field {
            Field::LoginEmail => &self.auth.login.email,
            Field::LoginPassword => &self.auth.login.password,
            Field::SignupName => &self.auth.signup.name,
            Field::SignupEmail => &self.auth.signup.email,
            Field::SignupPassword => &self.auth.signup.password,
            Field::SignupConfirm => &self.auth.signup.confirm_password,
            Field::UsersSearch => self.users.search.input(),
            Field::ReferralSearch => self.referrals.search.input(),
            Field::WithdrawalUser => self.withdrawals.user_filter.input(),
            Field::Note(nf) => {
                let draft = self.note_target.as_deref().and_then(|id| self.withdrawals.note(id));
                match (draft, nf) {
                    (Some(d), NoteField::PaymentRef) => &d.payment_ref,
                    (Some(d), NoteField::AdminNote) => &d.admin_note,
                    (None, _) => "",
                }
            }
            Field::Message(mf) => self.messages.form.field(mf),
        }
    }

    pub fn is_copied(&self, request_id: &str, field: CopyField) -> bool {
        self.copy_feedback.is_copied(&copy_key(request_id, field.key()), Instant::now())
    }

    /// Show a toast notification for 2 seconds
    pub fn show_toast(&mut self, msg: String) {
        self.toast(msg, ToastKind::Success);
    }

    pub fn show_error_toast(&mut self, msg: String) {
        self.toast(msg, ToastKind::Error);
    }

    fn toast(&mut self, msg: String, kind: ToastKind) {
        self.log_debug(format!("toast: {msg}"));
        self.toast_message = Some((msg, kind, Instant::now()));
    }

    pub fn toast_message(&self) -> Option<(&str, ToastKind)> {
        self.toast_message
            .as_ref()
            .filter(|(_, _, at)| at.elapsed() < TOAST_DURATION)
            .map(|(msg, kind, _)| (msg.as_str(), *kind))
    }

    pub fn log_debug(&mut self, msg: String) {
        log::debug!("{msg}");
        self.debug_log.push(msg);
        if self.debug_log.len() > MAX_LOG_ENTRIES {
            self.debug_log.remove(0);
        }
    }

    /// Toggle debug panel visibility (Ctrl+D)
    pub fn toggle_debug_panel(&mut self) {
        self.debug_visible = !self.debug_visible;
        self.log_debug(format!("Debug panel: {}", if self.debug_visible { "visible" } else { "hidden" }));
    }

    pub fn quit(&mut self) {
        self.quit = true;
    }

    // ----- requests -----

    /// Stamp queued requests with the current token for the runtime.
    pub fn take_commands(&mut self) -> Vec<Command> {
        let token = self.session.as_ref().map(|s| s.token.clone());
        self.outbox
            .drain()
            .into_iter()
            .map(|(seq, request)| Command { seq, token: token.clone(), request })
            .collect()
    }

    pub fn on_event(&mut self, ev: AppEvent) {
        match ev {
            AppEvent::Quit => self.quit = true,
            AppEvent::Response { seq, kind, result } => self.on_response(seq, kind, result),
        }
    }

    fn on_response(&mut self, seq: u64, kind: RequestKind, result: Result<Outcome, ApiError>) {
        if let Err(e) = &result {
            self.log_debug(format!("#{seq} {kind:?} failed: {e}"));
        }
        let now = Utc::now();
        match kind {
            RequestKind::Login => {
                if let Some(AuthOutcome::SignedIn(session)) = self.auth.on_login_response(seq, result, now) {
                    self.sign_in(session);
                }
            }
            RequestKind::Signup => {
                if let Some(AuthOutcome::SignedUp { email }) = self.auth.on_signup_response(seq, result) {
                    log::info!("[app] admin account created for {email}");
                    self.screen = Screen::Login;
                    self.auth_field = 1;
                    self.editing = Some(Field::LoginPassword);
                    self.show_toast("Account created. Please sign in.".to_string());
                }
            }
            RequestKind::Overview => self.home.on_response(seq, result),
            RequestKind::Users => self.users.on_response(seq, result, now),
            RequestKind::ReferralSearch => self.referrals.on_search_response(seq, result, now),
            RequestKind::ReferralTree => self.referrals.on_tree_response(seq, result, now),
            RequestKind::NonPaidReferrals => self.referrals.on_non_paid_response(seq, result, now),
            RequestKind::Withdrawals => self.withdrawals.on_list_response(seq, result),
            RequestKind::UpdateWithdrawal => {
                let was_busy = self.withdrawals.busy_id().is_some();
                self.withdrawals.on_update_response(seq, result, &mut self.outbox);
                if was_busy && self.withdrawals.busy_id().is_none() {
                    let notice = match (self.withdrawals.action_success(), self.withdrawals.action_error()) {
                        (Some(msg), _) => Some((msg.to_string(), ToastKind::Success)),
                        (_, Some(msg)) => Some((msg.to_string(), ToastKind::Error)),
                        _ => None,
                    };
                    if let Some((msg, kind)) = notice {
                        self.toast(msg, kind);
                    }
                }
            }
            RequestKind::SendMessage => self.messages.on_response(seq, result),
            RequestKind::ExportCsv | RequestKind::UploadImage => match result {
                Ok(Outcome::Saved { path, bytes }) => {
                    self.show_toast(format!("Saved {} ({bytes} bytes)", path.display()));
                }
                Ok(Outcome::Json(_)) => self.show_toast("Upload complete".to_string()),
                Err(e) => self.show_error_toast(e.to_string()),
            },
        }
    }

    fn sign_in(&mut self, session: AdminSession) {
        if let Err(e) = session.save(self.store.as_mut()) {
            log::warn!("[app] could not persist session: {e:#}");
        }
        log::info!("[app] signed in as {}", session.profile.display());
        self.show_toast(format!("Signed in as {}", session.profile.display()));
        self.session = Some(session);
        self.screen = Screen::Dashboard;
        self.editing = None;
        self.tab = Tab::Home;
        self.activate_tab();
    }

    /// Stamp the session log, drop the token and reset every tab.
    pub fn logout(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        if let Err(e) = session.end(self.store.as_mut(), Utc::now()) {
            log::warn!("[app] could not clear stored session: {e:#}");
        }
        log::info!("[app] signed out");

        let users = UsersController::new(self.users.limit(), self.users.search.window());
        let referrals = ReferralsController::new(self.referrals.depth(), self.referrals.search.window());
        let withdrawals = WithdrawalsController::new(self.withdrawals.user_filter.window());
        self.users = users;
        self.referrals = referrals;
        self.withdrawals = withdrawals;
        self.home = HomeController::default();
        self.messages = MessagesController::default();
        self.auth = AuthController::default();
        self.outbox.drain();

        self.screen = Screen::Login;
        self.tab = Tab::Home;
        self.auth_field = 0;
        self.editing = Some(Field::LoginEmail);
        self.show_toast("Signed out".to_string());
    }

    // ----- timers -----

    /// Loop tick: settles debounced inputs and expires copy feedback.
    pub fn tick(&mut self, now: Instant) {
        if self.screen != Screen::Dashboard {
            return;
        }
        self.users.tick(now, self.tab == Tab::Users, &mut self.outbox);
        self.referrals.tick(now, self.tab == Tab::Referrals, &mut self.outbox);
        self.withdrawals.tick(now, self.tab == Tab::Withdrawals, &mut self.outbox);
        self.copy_feedback.tick(now);
    }

    // ----- auth screens -----

    pub fn auth_next_field(&mut self) {
        let fields = self.auth_fields();
        self.auth_field = (self.auth_field + 1) % fields.len();
        self.editing = Some(fields[self.auth_field]);
    }

    pub fn auth_prev_field(&mut self) {
        let fields = self.auth_fields();
        self.auth_field = (self.auth_field + fields.len() - 1) % fields.len();
        self.editing = Some(fields[self.auth_field]);
    }

    /// Toggle between the login and signup forms.
    pub fn switch_auth_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Signup => Screen::Login,
            Screen::Login => Screen::Signup,
            Screen::Dashboard => return,
        };
        self.auth.clear_error();
        self.auth_field = 0;
        self.editing = Some(self.auth_fields()[0]);
    }

    pub fn submit_auth(&mut self) {
        match self.screen {
            Screen::Login => self.auth.submit_login(&mut self.outbox),
            Screen::Signup => self.auth.submit_signup(&mut self.outbox),
            Screen::Dashboard => {}
        }
    }

    // ----- text input -----

    pub fn start_edit(&mut self, field: Field) {
        if let Field::Note(_) = field {
            match self.withdrawals.selected_item().map(|w| w.id.clone()) {
                Some(Some(id)) => self.note_target = Some(id),
                Some(None) => {
                    self.show_error_toast(MISSING_ID.to_string());
                    return;
                }
                None => return,
            }
        }
        self.log_debug(format!("edit {field:?}"));
        self.editing = Some(field);
    }

    /// Begin typing into the search box of the current tab.
    pub fn start_search(&mut self) {
        let field = match self.tab {
            Tab::Users => Field::UsersSearch,
            Tab::Referrals => {
                self.referral_pane = ReferralPane::Search;
                Field::ReferralSearch
            }
            Tab::Withdrawals => Field::WithdrawalUser,
            _ => return,
        };
        self.start_edit(field);
    }

    pub fn input_char(&mut self, c: char) {
        let Some(field) = self.editing else {
            return;
        };
        let now = Instant::now();
        match field {
            Field::UsersSearch => self.users.search.push(c, now),
            Field::ReferralSearch => self.referrals.search.push(c, now),
            Field::WithdrawalUser => self.withdrawals.user_filter.push(c, now),
            _ => {
                if let Some(text) = self.plain_field_mut(field) {
                    text.push(c);
                }
            }
        }
        if matches!(field, Field::Message(_)) {
            self.messages.clear_status();
        }
    }

    pub fn input_backspace(&mut self) {
        let Some(field) = self.editing else {
            return;
        };
        let now = Instant::now();
        match field {
            Field::UsersSearch => self.users.search.backspace(now),
            Field::ReferralSearch => self.referrals.search.backspace(now),
            Field::WithdrawalUser => self.withdrawals.user_filter.backspace(now),
            _ => {
                if let Some(text) = self.plain_field_mut(field) {
                    text.pop();
                }
            }
        }
    }

    fn plain_field_mut(&mut self, field: Field) -> Option<&mut String> {
        Some(match field {
            Field::LoginEmail => &mut self.auth.login.email,
            Field::LoginPassword => &mut self.auth.login.password,
            Field::SignupName => &mut self.auth.signup.name,
            Field::SignupEmail => &mut self.auth.signup.email,
            Field::SignupPassword => &mut self.auth.signup.password,
            Field::SignupConfirm => &mut self.auth.signup.confirm_password,
            Field::Note(nf) => {
                let id = self.note_target.as_deref()?;
                let draft = self.withdrawals.note_mut(id);
                match nf {
                    NoteField::PaymentRef => &mut draft.payment_ref,
                    NoteField::AdminNote => &mut draft.admin_note,
                }
            }
            Field::Message(mf) => self.messages.form.field_mut(mf),
            Field::UsersSearch | Field::ReferralSearch | Field::WithdrawalUser => return None,
        })
    }

    /// Enter while editing: searches settle immediately, other fields close.
    pub fn commit_input(&mut self) {
        let Some(field) = self.editing.take() else {
            return;
        };
        match field {
            Field::UsersSearch => self.users.submit_search(self.tab == Tab::Users, &mut self.outbox),
            Field::ReferralSearch => self.referrals.submit_search(self.tab == Tab::Referrals, &mut self.outbox),
            Field::WithdrawalUser => self
                .withdrawals
                .submit_user_filter(self.tab == Tab::Withdrawals, &mut self.outbox),
            _ => {}
        }
    }

    pub fn cancel_input(&mut self) {
        self.editing = None;
    }

    // ----- navigation -----

    pub fn next_tab(&mut self) {
        self.step_tab(1);
    }

    pub fn prev_tab(&mut self) {
        self.step_tab(Tab::ALL.len() - 1);
    }

    /// Move through enabled tabs only.
    fn step_tab(&mut self, step: usize) {
        let len = Tab::ALL.len();
        let mut idx = Tab::ALL.iter().position(|t| *t == self.tab).unwrap_or(0);
        for _ in 0..len {
            idx = (idx + step) % len;
            if Tab::ALL[idx].enabled() {
                break;
            }
        }
        self.select_tab(Tab::ALL[idx]);
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if !tab.enabled() {
            self.show_toast(format!("{} is coming soon", tab.label()));
            return;
        }
        if tab == self.tab {
            return;
        }
        self.log_debug(format!("tab {:?} -> {:?}", self.tab, tab));
        self.tab = tab;
        self.editing = None;
        self.activate_tab();
    }

    /// Fetch whatever the visible tab shows.
    fn activate_tab(&mut self) {
        match self.tab {
            Tab::Home => self.home.load(&mut self.outbox),
            Tab::Users => self.users.load(&mut self.outbox),
            Tab::Referrals => self.referrals.activate(&mut self.outbox),
            Tab::Withdrawals => self.withdrawals.load(&mut self.outbox),
            _ => {}
        }
    }

    /// Manual retry for the visible tab.
    pub fn refresh(&mut self) {
        self.activate_tab();
    }

    pub fn up(&mut self) {
        match self.tab {
            Tab::Users => self.users.select_prev(),
            Tab::Referrals => match self.referral_pane {
                ReferralPane::Search => self.referrals.select_result(-1),
                ReferralPane::Tree => self.referrals.select_level(-1),
                ReferralPane::NonPaid => {}
            },
            Tab::Withdrawals => self.withdrawals.select(-1),
            Tab::Messages => self.message_field = self.message_field.saturating_sub(1),
            _ => {}
        }
    }

    pub fn down(&mut self) {
        match self.tab {
            Tab::Users => self.users.select_next(),
            Tab::Referrals => match self.referral_pane {
                ReferralPane::Search => self.referrals.select_result(1),
                ReferralPane::Tree => self.referrals.select_level(1),
                ReferralPane::NonPaid => {}
            },
            Tab::Withdrawals => self.withdrawals.select(1),
            Tab::Messages => {
                if self.message_field + 1 < self.messages.fields().len() {
                    self.message_field += 1;
                }
            }
            _ => {}
        }
    }

    pub fn left(&mut self) {
        match self.tab {
            Tab::Users => {
                self.users.prev_page(&mut self.outbox);
            }
            Tab::Referrals => match self.referral_pane {
                ReferralPane::NonPaid => self.referrals.non_paid_prev(&mut self.outbox),
                _ => self.referral_pane = ReferralPane::Search,
            },
            _ => {}
        }
    }

    pub fn right(&mut self) {
        match self.tab {
            Tab::Users => {
                self.users.next_page(&mut self.outbox);
            }
            Tab::Referrals => match self.referral_pane {
                ReferralPane::NonPaid => self.referrals.non_paid_next(&mut self.outbox),
                _ => self.referral_pane = ReferralPane::Tree,
            },
            _ => {}
        }
    }

    /// Enter in normal mode.
    pub fn enter(&mut self) {
        match self.tab {
            Tab::Users => self.open_selected_user_referrals(),
            Tab::Referrals => match self.referral_pane {
                ReferralPane::Search => {
                    if self.referrals.pick_result(&mut self.outbox) {
                        self.referral_pane = ReferralPane::Tree;
                    }
                }
                ReferralPane::Tree => self.referrals.toggle_selected_level(),
                ReferralPane::NonPaid => {}
            },
            Tab::Messages => self.start_edit(Field::Message(self.message_field())),
            _ => {}
        }
    }

    /// Jump from the user directory to that user's referral tree.
    pub fn open_selected_user_referrals(&mut self) {
        let Some(focus) = self.users.selected_user().map(ReferralFocus::from) else {
            return;
        };
        if focus.id.is_none() {
            self.show_error_toast("This user has no ID to look up.".to_string());
            return;
        }
        self.referrals.set_focus(focus, false, &mut self.outbox);
        self.referral_pane = ReferralPane::Tree;
        self.select_tab(Tab::Referrals);
    }

    // ----- tab actions -----

    pub fn cycle_page_size(&mut self) {
        self.users.cycle_limit(&mut self.outbox);
    }

    pub fn toggle_non_paid(&mut self) {
        if self.referral_pane == ReferralPane::NonPaid {
            self.referral_pane = ReferralPane::Tree;
            return;
        }
        if self.referrals.focus().is_none() {
            return;
        }
        self.referral_pane = ReferralPane::NonPaid;
        if self.referrals.non_paid.data().is_none() {
            self.referrals.load_non_paid(&mut self.outbox);
        }
    }

    pub fn cycle_withdrawal_filter(&mut self) {
        self.withdrawals.cycle_filter(&mut self.outbox);
    }

    pub fn mark_selected(&mut self, status: WithdrawalStatus) {
        if !self.withdrawals.actions_visible() {
            return;
        }
        match self.withdrawals.selected_item() {
            Some(item) if !item.status.is_final() => {}
            Some(_) => {
                self.show_error_toast("This request is already settled.".to_string());
                return;
            }
            None => return,
        }
        self.withdrawals.update_selected(status, &mut self.outbox);
        if let Some(msg) = self.withdrawals.action_error().map(str::to_string) {
            self.show_error_toast(msg);
        }
    }

    /// Copy a payout detail of the selected withdrawal.
    pub fn copy_selected(&mut self, field: CopyField) {
        if !self.withdrawals.copy_visible() {
            return;
        }
        let Some(item) = self.withdrawals.selected_item() else {
            return;
        };
        let value = match field {
            CopyField::AccountNumber => item.bank.account_number.clone(),
            CopyField::Ifsc => item.bank.ifsc.clone(),
            CopyField::Upi => item.upi.upi_id.clone(),
        };
        let key = copy_key(item.id.as_deref().unwrap_or_default(), field.key());
        let Some(value) = value else {
            self.show_error_toast(format!("No {} on this request", field.label()));
            return;
        };
        if crate::platform::copy_to_clipboard(&value) {
            self.copy_feedback.mark(key, Instant::now());
            self.show_toast(format!("Copied {}", field.label()));
        } else {
            self.show_error_toast("Copy failed".to_string());
        }
    }

    pub fn cycle_message_category(&mut self) {
        self.messages.cycle_category();
    }

    pub fn toggle_message_type(&mut self) {
        self.messages.toggle_kind();
        self.message_field = 0;
    }

    pub fn send_message(&mut self) {
        self.editing = None;
        self.messages.submit(&mut self.outbox);
    }

    /// CSV export for the visible tab.
    pub fn export_current(&mut self) {
        let (export, params) = match self.tab {
            Tab::Home => (CsvExport::WalletWithdrawals, Vec::new()),
            Tab::Users => (CsvExport::Phones, Vec::new()),
            Tab::Withdrawals => (CsvExport::ReferralWithdrawals, self.withdrawals.query().to_params()),
            _ => return,
        };
        self.outbox.send(Request::ExportCsv { export, params });
        self.show_toast(format!("Exporting {}...", export.fallback_name()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{from_args, CliArgs};
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn app() -> App {
        let cfg = from_args(CliArgs::default()).unwrap();
        App::new(&cfg, Box::new(MemoryStore::new()))
    }

    fn respond(app: &mut App, cmd: &Command, body: serde_json::Value) {
        app.on_event(AppEvent::Response {
            seq: cmd.seq,
            kind: cmd.request.kind(),
            result: Ok(Outcome::Json(body)),
        });
    }

    #[test]
    fn starts_on_signup_without_session() {
        let mut a = app();
        assert_eq!(a.screen(), Screen::Signup);
        assert_eq!(a.editing(), Some(Field::SignupName));
        assert!(a.take_commands().is_empty());
    }

    #[test]
    fn login_lands_on_home_and_loads_overview() {
        let mut a = app();
        a.switch_auth_screen();
        for c in "ops@x.in".chars() {
            a.input_char(c);
        }
        a.auth_next_field();
        for c in "pw".chars() {
            a.input_char(c);
        }
        a.submit_auth();
        let cmds = a.take_commands();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].token, None);
        respond(&mut a, &cmds[0], json!({"token": "tk", "admin": {"name": "Ops"}}));

        assert_eq!(a.screen(), Screen::Dashboard);
        let cmds = a.take_commands();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].request.kind(), RequestKind::Overview);
        assert_eq!(cmds[0].token.as_deref(), Some("tk"));
    }

    #[test]
    fn tab_cycle_skips_disabled_entries() {
        let mut a = app();
        a.screen = Screen::Dashboard;
        a.tab = Tab::Withdrawals;
        a.next_tab();
        assert_eq!(a.tab(), Tab::Home);
        a.prev_tab();
        assert_eq!(a.tab(), Tab::Withdrawals);
        a.select_tab(Tab::Settings);
        assert_eq!(a.tab(), Tab::Withdrawals);
    }

    #[test]
    fn user_row_opens_referral_tree_once() {
        let mut a = app();
        a.screen = Screen::Dashboard;
        a.select_tab(Tab::Users);
        let cmds = a.take_commands();
        respond(&mut a, &cmds[0], json!({"items": [{"_id": "u7", "name": "Asha"}], "total": 1}));
        a.enter();
        let cmds = a.take_commands();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].request, Request::ReferralTree { user_id: "u7".into(), depth: 10 });
        assert_eq!(a.tab(), Tab::Referrals);
    }

    #[test]
    fn debug_log_is_capped() {
        let mut a = app();
        for i in 0..80 {
            a.log_debug(format!("line {i}"));
        }
        assert_eq!(a.debug_log().len(), MAX_LOG_ENTRIES);
        assert_eq!(a.debug_log()[0], "line 30");
    }
}
