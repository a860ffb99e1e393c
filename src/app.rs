use futures::TryStreamExt;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{FeedRecord, NewFeed, Notice, ViewerState};
use crate::services::normalize;
use crate::tui::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Name,
    Url,
}

/// The add-feed form while it is open.
#[derive(Debug, Clone, Default)]
pub struct FeedForm {
    pub name: String,
    pub url: String,
    pub focus: FormField,
}

impl FeedForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Name => &mut self.name,
            FormField::Url => &mut self.url,
        }
    }

    fn next_field(&mut self) {
        self.focus = match self.focus {
            FormField::Name => FormField::Url,
            FormField::Url => FormField::Name,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Form,
    ConfirmDelete,
    Help,
}

pub struct App {
    // Data, newest first
    pub cards: Vec<FeedRecord>,

    // UI State
    pub selected_index: usize,
    pub active_feed_id: Option<i64>,
    pub viewer: Option<ViewerState>,
    pub notice: Option<Notice>,
    pub show_help: bool,
    pub form: Option<FeedForm>,
    pub pending_delete: Option<i64>,

    // Services
    pub repository: Repository,
}

impl App {
    /// Builds the controller around an already opened store and renders it.
    pub async fn new(repository: Repository) -> Result<Self> {
        let mut app = Self {
            cards: Vec::new(),
            selected_index: 0,
            active_feed_id: None,
            viewer: None,
            notice: None,
            show_help: false,
            form: None,
            pending_delete: None,
            repository,
        };
        app.load_all().await?;
        Ok(app)
    }

    pub fn input_mode(&self) -> InputMode {
        if self.show_help {
            InputMode::Help
        } else if self.pending_delete.is_some() {
            InputMode::ConfirmDelete
        } else if self.form.is_some() {
            InputMode::Form
        } else {
            InputMode::Normal
        }
    }

    pub fn selected_card(&self) -> Option<&FeedRecord> {
        self.cards.get(self.selected_index)
    }

    pub fn is_active(&self, record: &FeedRecord) -> bool {
        self.active_feed_id == Some(record.id)
    }

    pub fn pending_delete_card(&self) -> Option<&FeedRecord> {
        let id = self.pending_delete?;
        self.cards.iter().find(|c| c.id == id)
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match self.dispatch(action).await {
            Ok(quit) => Ok(quit),
            Err(e @ (AppError::Validation(_) | AppError::Embed(_))) => {
                tracing::warn!("{}", e);
                self.notice = Some(Notice::warning(e.to_string()));
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn dispatch(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                if self.selected_index + 1 < self.cards.len() {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => {
                self.selected_index = 0;
            }

            AppAction::MoveToBottom => {
                self.selected_index = self.cards.len().saturating_sub(1);
            }

            AppAction::SelectFeed => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    self.select_feed(id)?;
                }
            }

            AppAction::OpenInBrowser => {
                if let Some(viewer) = &self.viewer {
                    let url = viewer.target.url.clone();
                    if let Err(e) = open::that(&url) {
                        tracing::warn!("Failed to open {}: {}", url, e);
                        self.notice = Some(Notice::error(format!("Could not open browser: {e}")));
                    }
                }
            }

            AppAction::Reload => {
                self.resync().await?;
            }

            AppAction::AddFeed => {
                self.form = Some(FeedForm::default());
            }

            AppAction::DeleteFeed => {
                if let Some(id) = self.selected_card().map(|c| c.id) {
                    self.request_delete(id);
                }
            }

            AppAction::ConfirmYes => {
                self.resolve_delete(true).await?;
            }

            AppAction::ConfirmNo => {
                self.resolve_delete(false).await?;
            }

            AppAction::ShowHelp => {
                self.show_help = true;
            }

            AppAction::HideHelp => {
                self.show_help = false;
            }

            AppAction::FormChar(c) => {
                if let Some(form) = &mut self.form {
                    form.focused_mut().push(c);
                }
            }

            AppAction::FormBackspace => {
                if let Some(form) = &mut self.form {
                    form.focused_mut().pop();
                }
            }

            AppAction::FormNextField => {
                if let Some(form) = &mut self.form {
                    form.next_field();
                }
            }

            AppAction::FormConfirm => {
                if let Some(form) = self.form.clone() {
                    self.add_feed(&form.name, &form.url).await?;
                }
            }

            AppAction::FormCancel => {
                self.form = None;
            }
        }

        Ok(false)
    }

    /// Rebuilds the card list from a fresh scan of the store.
    ///
    /// The scan yields oldest first; the list is reversed once so it ends up newest first.
    pub async fn load_all(&mut self) -> Result<()> {
        self.cards.clear();

        let mut scan = std::pin::pin!(self.repository.scan_all());
        while let Some(record) = scan.try_next().await? {
            self.cards.push(record);
        }
        self.cards.reverse();

        if self.selected_index >= self.cards.len() {
            self.selected_index = self.cards.len().saturating_sub(1);
        }
        if let Some(id) = self.active_feed_id {
            if !self.cards.iter().any(|c| c.id == id) {
                self.active_feed_id = None;
                self.viewer = None;
            }
        }

        tracing::debug!("Loaded {} feeds", self.cards.len());
        Ok(())
    }

    /// Full resync: the view is rebuilt from the store and the viewer is reset.
    pub async fn resync(&mut self) -> Result<()> {
        self.active_feed_id = None;
        self.viewer = None;
        self.selected_index = 0;
        self.load_all().await
    }

    pub async fn add_feed(&mut self, name: &str, url: &str) -> Result<FeedRecord> {
        let feed = NewFeed::new(name, url)?;
        let record = self.repository.insert_feed(feed).await?;

        self.cards.insert(0, record.clone());
        self.selected_index = 0;
        self.form = None;
        self.notice = Some(Notice::info(format!("Saved \"{}\"", record.name)));

        Ok(record)
    }

    /// Asks for confirmation before anything is deleted.
    pub fn request_delete(&mut self, id: i64) {
        self.pending_delete = Some(id);
    }

    pub async fn resolve_delete(&mut self, confirmed: bool) -> Result<()> {
        let Some(id) = self.pending_delete.take() else {
            return Ok(());
        };
        if !confirmed {
            return Ok(());
        }

        self.repository.delete_feed(id).await?;
        self.resync().await?;
        self.notice = Some(Notice::info("Feed removed from history"));
        Ok(())
    }

    /// Marks the card as the only active one and points the viewer at its embed target.
    ///
    /// A URL that cannot be embedded leaves both the active card and the viewer untouched.
    pub fn select_feed(&mut self, id: i64) -> Result<()> {
        let Some(record) = self.cards.iter().find(|c| c.id == id) else {
            return Ok(());
        };

        let target = normalize(&record.url)?;
        let viewer = ViewerState {
            title: record.name.clone(),
            target,
        };

        tracing::info!("Streaming {} from {}", viewer.title, viewer.target.url);
        self.active_feed_id = Some(id);
        self.viewer = Some(viewer);
        self.notice = None;
        Ok(())
    }
}
