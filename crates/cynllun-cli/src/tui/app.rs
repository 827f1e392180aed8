//! Wizard TUI application state and data model.
//!
//! Everything here is terminal-free: key handling mutates plain state, the
//! event loop in `mod.rs` drives it, and `ui.rs` renders it. Generation
//! runs on spawned tasks and reports back over an mpsc channel carrying the
//! session ticket, so a stale response can never clobber a fresher one.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use cynllun_core::catalog::Catalog;
use cynllun_core::gateway::GenerationGateway;
use cynllun_core::leads::{Lead, LeadStore};
use cynllun_core::parse::{ActivityCard, parse_activities};
use cynllun_core::selection::{Category, Duration};
use cynllun_core::session::{GenerationTicket, PlanSession};
use cynllun_core::summary;
use cynllun_core::wizard::StepId;

/// Which surface the TUI is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The wizard step itself.
    Wizard,
    /// Detail overlay for the highlighted card.
    Detail,
    /// Registration form overlay.
    Register,
}

/// Fields of the setting form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Topic,
    Step,
    Duration,
    Context,
}

impl FormField {
    const ORDER: [FormField; 4] = [
        FormField::Topic,
        FormField::Step,
        FormField::Duration,
        FormField::Context,
    ];

    fn next(self) -> FormField {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn prev(self) -> FormField {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Action deferred until the registration gate opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Generate,
    Save,
}

/// One pickable card on the current step, resolved for display.
#[derive(Debug, Clone)]
pub struct CardRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub selected: bool,
}

type GenerationResult = (GenerationTicket, Result<String, String>);

/// Application state for the wizard TUI.
pub struct App {
    pub catalog: &'static Catalog,
    pub session: PlanSession,
    pub gateway: Arc<dyn GenerationGateway>,
    pub leads: LeadStore,

    pub mode: Mode,
    pub selected_card: usize,
    pub form_focus: FormField,
    pub register_fields: [String; 3],
    pub register_focus: usize,
    pending_action: Option<PendingAction>,

    pub loading: bool,
    pub status_message: Option<String>,
    pub activity_cards: Vec<ActivityCard>,
    pub scroll: u16,
    pub should_quit: bool,

    tx: mpsc::UnboundedSender<GenerationResult>,
    rx: mpsc::UnboundedReceiver<GenerationResult>,
}

impl App {
    pub fn new(gateway: Arc<dyn GenerationGateway>, leads: LeadStore) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            catalog: Catalog::get(),
            session: PlanSession::new(),
            gateway,
            leads,
            mode: Mode::Wizard,
            selected_card: 0,
            form_focus: FormField::Topic,
            register_fields: [String::new(), String::new(), String::new()],
            register_focus: 0,
            pending_action: None,
            loading: false,
            status_message: None,
            activity_cards: Vec::new(),
            scroll: 0,
            should_quit: false,
            tx,
            rx,
        }
    }

    pub fn current_step(&self) -> StepId {
        self.session.cursor.step().id
    }

    /// The pickable cards for the current step, resolved from the catalog.
    /// Empty for the setting and plan steps.
    pub fn step_cards(&self) -> Vec<CardRow> {
        let sel = &self.session.selection;
        match self.current_step() {
            StepId::Purpose => self
                .catalog
                .purposes
                .iter()
                .map(|p| CardRow {
                    id: p.id.clone(),
                    title: format!("{} {}", p.icon, p.title),
                    category: "Four Purposes".to_string(),
                    summary: p.subtitle.clone(),
                    selected: sel.is_selected(Category::Purposes, &p.id),
                })
                .collect(),
            StepId::Area => self
                .catalog
                .areas
                .iter()
                .map(|a| CardRow {
                    id: a.id.clone(),
                    title: format!("{} {}", a.icon, a.title),
                    category: "Area of Learning & Experience".to_string(),
                    summary: a.disciplines.clone(),
                    selected: sel.is_selected(Category::Areas, &a.id),
                })
                .collect(),
            StepId::Statements => {
                // Statements scoped to the currently selected areas.
                let mut rows = Vec::new();
                for id in sel.selected(Category::Areas) {
                    if let Some(area) = self.catalog.area(id) {
                        for s in &area.statements {
                            rows.push(CardRow {
                                id: s.id.clone(),
                                title: s.title.clone(),
                                category: area.title.clone(),
                                summary: s.summary.clone(),
                                selected: sel.is_selected(Category::Statements, &s.id),
                            });
                        }
                    }
                }
                rows
            }
            StepId::Skills => self
                .catalog
                .cross_curricular_skills
                .iter()
                .map(|s| (s, "Cross-Curricular Skill"))
                .chain(self.catalog.wider_skills.iter().map(|s| (s, "Wider Skill")))
                .map(|(s, category)| CardRow {
                    id: s.id.clone(),
                    title: format!("{} {}", s.icon, s.title),
                    category: category.to_string(),
                    summary: s.description.clone(),
                    selected: sel.is_selected(Category::Skills, &s.id),
                })
                .collect(),
            StepId::Teaching => self
                .catalog
                .teaching_methods
                .iter()
                .map(|m| CardRow {
                    id: m.id.clone(),
                    title: format!("{} {} ({})", m.icon, m.title, m.abbrev),
                    category: "Teaching Method".to_string(),
                    summary: m.description.clone(),
                    selected: sel.is_selected(Category::TeachingMethods, &m.id),
                })
                .collect(),
            StepId::Assessment => self
                .catalog
                .assessment_methods
                .iter()
                .map(|m| CardRow {
                    id: m.id.clone(),
                    title: format!("{} {}", m.icon, m.title),
                    category: "Assessment Method".to_string(),
                    summary: m.description.clone(),
                    selected: sel.is_selected(Category::AssessmentMethods, &m.id),
                })
                .collect(),
            StepId::Setting | StepId::Plan => Vec::new(),
        }
    }

    // -- Key handling -------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Register => self.handle_register_key(key),
            Mode::Detail => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.mode = Mode::Wizard;
                }
            }
            Mode::Wizard => self.handle_wizard_key(key),
        }
    }

    fn handle_wizard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right => self.next_step(),
            KeyCode::Left => {
                self.session.cursor.prev();
                self.after_navigation();
            }
            KeyCode::Esc => {
                if !self.session.cursor.prev() {
                    self.should_quit = true;
                }
                self.after_navigation();
            }
            _ => match self.current_step() {
                StepId::Setting => self.handle_setting_key(key),
                StepId::Plan => self.handle_plan_key(key),
                _ => self.handle_pick_key(key),
            },
        }
    }

    fn next_step(&mut self) {
        // Advance is unconditional; readiness is advisory and surfaced by
        // the renderer instead.
        self.session.cursor.next();
        self.after_navigation();
    }

    fn after_navigation(&mut self) {
        self.selected_card = 0;
        self.scroll = 0;
    }

    fn handle_setting_key(&mut self, key: KeyEvent) {
        let setting = &mut self.session.selection.setting;
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.form_focus = self.form_focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.form_focus = self.form_focus.prev(),
            KeyCode::Enter => {
                if self.form_focus == FormField::Context {
                    self.next_step();
                } else {
                    self.form_focus = self.form_focus.next();
                }
            }
            KeyCode::Char(' ') if self.form_focus == FormField::Step => {
                setting.progression_step = cycle_step(self.catalog, setting.progression_step);
            }
            KeyCode::Char(' ') if self.form_focus == FormField::Duration => {
                setting.duration = cycle_duration(setting.duration);
            }
            KeyCode::Char(c) => match self.form_focus {
                FormField::Topic => setting.topic.push(c),
                FormField::Context => setting.context.push(c),
                FormField::Step | FormField::Duration => {}
            },
            KeyCode::Backspace => match self.form_focus {
                FormField::Topic => {
                    setting.topic.pop();
                }
                FormField::Context => {
                    setting.context.pop();
                }
                FormField::Step => setting.progression_step = None,
                FormField::Duration => setting.duration = None,
            },
            _ => {}
        }
    }

    fn handle_pick_key(&mut self, key: KeyEvent) {
        let cards = self.step_cards();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if !cards.is_empty() && self.selected_card < cards.len() - 1 {
                    self.selected_card += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if self.selected_card > 0 {
                    self.selected_card -= 1;
                }
            }
            KeyCode::Char(' ') => {
                if let (Some(card), Some(category)) =
                    (cards.get(self.selected_card), self.current_step().category())
                {
                    match self.session.selection.toggle(self.catalog, category, &card.id) {
                        Ok(()) => {}
                        Err(e) => self.status_message = Some(format!("Toggle failed: {e}")),
                    }
                }
            }
            KeyCode::Enter => {
                if cards.get(self.selected_card).is_some() {
                    self.mode = Mode::Detail;
                }
            }
            KeyCode::Char(c @ '1'..='8') => {
                let target = (c as usize) - ('1' as usize);
                // Ahead-jumps are rejected silently by the cursor.
                if self.session.cursor.jump_to(target) {
                    self.after_navigation();
                }
            }
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_plan_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char('g') => self.request_generation(),
            KeyCode::Char('s') => self.request_save(),
            KeyCode::Char('r') => self.open_register(None),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_register_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Wizard;
                self.pending_action = None;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.register_focus = (self.register_focus + 1) % self.register_fields.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.register_focus =
                    (self.register_focus + self.register_fields.len() - 1) % self.register_fields.len();
            }
            KeyCode::Char(c) => self.register_fields[self.register_focus].push(c),
            KeyCode::Backspace => {
                self.register_fields[self.register_focus].pop();
            }
            KeyCode::Enter => self.submit_registration(),
            _ => {}
        }
    }

    // -- Gated actions ------------------------------------------------------

    fn open_register(&mut self, pending: Option<PendingAction>) {
        self.mode = Mode::Register;
        self.register_focus = 0;
        self.pending_action = pending;
    }

    /// Trigger activity generation, routing through the registration gate
    /// first. Repeated requests are tolerated: each gets a fresh ticket and
    /// only the latest response is kept.
    pub fn request_generation(&mut self) {
        if !self.session.is_registered() {
            self.open_register(Some(PendingAction::Generate));
            return;
        }
        self.start_generation();
    }

    pub fn request_save(&mut self) {
        if !self.session.is_registered() {
            self.open_register(Some(PendingAction::Save));
            return;
        }
        self.save_plan();
    }

    fn submit_registration(&mut self) {
        let [name, email, school] = &self.register_fields;
        if name.trim().is_empty() || email.trim().is_empty() {
            self.status_message = Some("Name and email are required".to_string());
            return;
        }

        let plan_type = match self.pending_action {
            Some(PendingAction::Generate) => "ai",
            _ => "pdf",
        };
        let lead = Lead::new(
            name.trim(),
            email.trim(),
            Some(school.trim().to_string()).filter(|s| !s.is_empty()),
            Some(plan_type.to_string()),
            None,
        );
        // Lead capture is best-effort: the session gate opens either way.
        if let Err(e) = self.leads.append(lead) {
            tracing::warn!(error = %e, "failed to record registration");
        }
        self.session.register();
        self.mode = Mode::Wizard;

        match self.pending_action.take() {
            Some(PendingAction::Generate) => self.start_generation(),
            Some(PendingAction::Save) => self.save_plan(),
            None => self.status_message = Some("Registered — diolch!".to_string()),
        }
    }

    fn start_generation(&mut self) {
        let ticket = self.session.begin_generation();
        let context = summary::plain_text_context(&self.session.selection, self.catalog);
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();

        self.loading = true;
        tokio::spawn(async move {
            let result = gateway
                .generate_activities(&context)
                .await
                .map_err(|e| e.to_string());
            // The receiver may be gone if the wizard exited mid-request.
            let _ = tx.send((ticket, result));
        });
    }

    /// Apply any finished generation results. Called from the event loop on
    /// every tick; stale tickets are dropped by the session.
    pub fn poll_generation(&mut self) {
        while let Ok((ticket, result)) = self.rx.try_recv() {
            match result {
                Ok(text) => {
                    if self.session.complete_generation(ticket, text) {
                        let text = self.session.enhancement().unwrap_or_default();
                        self.activity_cards = parse_activities(text);
                        self.loading = false;
                        self.status_message = Some(if self.activity_cards.is_empty() {
                            "Activities generated (shown verbatim)".to_string()
                        } else {
                            format!("{} activity ideas generated", self.activity_cards.len())
                        });
                    }
                }
                Err(message) => {
                    self.loading = false;
                    self.status_message =
                        Some(format!("Generation failed: {message} — press g to retry"));
                }
            }
        }
    }

    fn save_plan(&mut self) {
        let doc = summary::full_summary(&self.session.selection, self.catalog);
        let text = doc.to_text(self.session.enhancement());
        let filename = format!(
            "cynllun-lesson-plan-{}.txt",
            chrono::Local::now().format("%Y-%m-%d")
        );
        match std::fs::write(&filename, text) {
            Ok(()) => self.status_message = Some(format!("Saved {filename}")),
            Err(e) => self.status_message = Some(format!("Save failed: {e}")),
        }
    }
}

fn cycle_step(catalog: &Catalog, current: Option<u8>) -> Option<u8> {
    let steps = &catalog.progression_steps;
    match current {
        None => steps.first().map(|p| p.step),
        Some(n) => {
            let idx = steps.iter().position(|p| p.step == n);
            match idx {
                Some(i) if i + 1 < steps.len() => Some(steps[i + 1].step),
                _ => None,
            }
        }
    }
}

fn cycle_duration(current: Option<Duration>) -> Option<Duration> {
    match current {
        None => Some(Duration::ALL[0]),
        Some(d) => {
            let idx = Duration::ALL.iter().position(|x| *x == d);
            match idx {
                Some(i) if i + 1 < Duration::ALL.len() => Some(Duration::ALL[i + 1]),
                _ => None,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
