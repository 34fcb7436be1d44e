//! Shell state and command execution.

use std::sync::Arc;

use colored::Colorize;
use pawmatch_application::{MatchOrchestrator, ResultsView, SearchResults, SearchStateEngine, SessionManager};
use pawmatch_core::catalog::{CatalogApi, Dog};
use pawmatch_core::config::ClientConfig;
use pawmatch_core::search::FilterUpdate;
use pawmatch_core::session::{Access, Credentials};
use pawmatch_core::storage::KeyValueStore;
use pawmatch_core::{PawError, Result};

use crate::command::{Command, HELP};

/// Whether the REPL should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub struct ShellApp {
    api: Arc<dyn CatalogApi>,
    store: Arc<dyn KeyValueStore>,
    session: Arc<SessionManager>,
    search: SearchStateEngine,
    results: SearchResults,
    matcher: MatchOrchestrator,
    signed_in: bool,
}

impl ShellApp {
    pub fn new(api: Arc<dyn CatalogApi>, store: Arc<dyn KeyValueStore>, config: &ClientConfig) -> Self {
        let session = Arc::new(
            SessionManager::new(Arc::clone(&api), Arc::clone(&store))
                .with_revalidate_interval(config.revalidate_interval()),
        );
        Self {
            search: SearchStateEngine::new(Arc::clone(&store)),
            results: SearchResults::new(Arc::clone(&api), config.stale_time()),
            matcher: MatchOrchestrator::new(Arc::clone(&api)),
            api,
            store,
            session,
            signed_in: false,
        }
    }

    /// Runs the initial session check and starts background revalidation.
    pub async fn start(&mut self) {
        self.session.initialize().await;
        self.session.start_revalidation();
        self.sync_session();

        if let Some(credentials) = self.session.snapshot().credentials {
            println!("{}", format!("Welcome back, {}!", credentials.name).bright_green());
        } else if self.signed_in {
            println!("{}", "Session restored.".bright_green());
        } else {
            println!("{}", "Not logged in. Use 'login <name> <email>'.".bright_black());
        }
    }

    pub fn shutdown(&self) {
        self.session.stop_revalidation();
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        self.sync_session();

        let outcome = match command {
            Command::Quit => return Flow::Exit,
            Command::Help => {
                println!("{}", HELP.bright_black());
                Ok(())
            }
            Command::Login { name, email } => self.login(Credentials::new(name, email)).await,
            Command::Status => {
                self.print_status();
                Ok(())
            }
            other => {
                if self.session.access() != Access::Granted {
                    println!("{}", "Please log in first.".yellow());
                    return Flow::Continue;
                }
                self.execute_protected(other).await
            }
        };

        if let Err(e) = outcome {
            print_error(&e);
        }
        Flow::Continue
    }

    async fn execute_protected(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Logout => {
                self.session.logout().await;
                self.reset_search();
                println!("{}", "Logged out.".bright_green());
                Ok(())
            }
            Command::Breeds => {
                let breeds = self.results.breeds().await?;
                println!("{}", breeds.join(", "));
                Ok(())
            }
            Command::Breed(breeds) => self.update_and_show(FilterUpdate::breeds(breeds)).await,
            Command::Age { min, max } => self.update_and_show(FilterUpdate::age_range(min, max)).await,
            Command::Sort(order) => self.update_and_show(FilterUpdate::sort(order)).await,
            Command::Size(size) => self.update_and_show(FilterUpdate::page_size(size)).await,
            Command::Zip(input) => {
                self.search.set_zip_code(&input)?;
                self.show_current().await
            }
            Command::Page(page) => {
                self.search.change_page(page)?;
                self.show_current().await
            }
            Command::Next => {
                let page = self.search.cursor().page() + 1;
                if let Some(total) = self.known_total_pages()
                    && u64::from(page) > total
                {
                    println!("{}", "Already on the last page.".bright_black());
                    return Ok(());
                }
                self.search.change_page(page)?;
                self.show_current().await
            }
            Command::Prev => {
                let page = self.search.cursor().page();
                if page <= 1 {
                    println!("{}", "Already on the first page.".bright_black());
                    return Ok(());
                }
                self.search.change_page(page - 1)?;
                self.show_current().await
            }
            Command::Clear => {
                self.search.clear_all()?;
                println!("{}", "Filters cleared.".bright_green());
                self.show_current().await
            }
            Command::Search => self.show_current().await,
            Command::Refresh => {
                if self.results.current_key().is_none() {
                    return self.show_current().await;
                }
                if let Some(view) = self.results.refresh().await? {
                    self.print_view(&view);
                }
                Ok(())
            }
            Command::Favorite(id) => {
                self.search.toggle_favorite(&id)?;
                self.print_favorites();
                Ok(())
            }
            Command::Unfavorite => {
                self.search.clear_favorite()?;
                self.print_favorites();
                Ok(())
            }
            Command::Match => {
                println!("{}", "Finding your match...".bright_black());
                let dog = self.matcher.generate_match(self.search.favorites()).await?;
                println!("{}", "It's a match!".bright_magenta().bold());
                print_dog(&dog, true);
                Ok(())
            }
            Command::Locations(zip_codes) => {
                let locations = self.api.locations(&zip_codes).await?;
                if locations.is_empty() {
                    println!("{}", "No locations found.".bright_black());
                }
                for location in locations {
                    println!(
                        "  {} {}, {} ({}) [{:.4}, {:.4}]",
                        location.zip_code.bright_cyan(),
                        location.city,
                        location.state,
                        location.county,
                        location.latitude,
                        location.longitude
                    );
                }
                Ok(())
            }
            Command::Quit | Command::Help | Command::Login { .. } | Command::Status => Ok(()),
        }
    }

    async fn login(&mut self, credentials: Credentials) -> Result<()> {
        self.session.login(credentials).await?;
        self.sync_session();
        println!("{}", "Logged in.".bright_green());
        self.show_current().await
    }

    /// Aligns the local search state with the session.
    ///
    /// Search state only exists while authenticated; it is restored from
    /// storage on sign-in and dropped when the session ends.
    fn sync_session(&mut self) {
        let authenticated = self.session.snapshot().authenticated;
        if authenticated && !self.signed_in {
            self.search = SearchStateEngine::restore(Arc::clone(&self.store));
            self.signed_in = true;
        } else if !authenticated && self.signed_in {
            println!("{}", "Your session has ended. Please log in again.".yellow());
            self.reset_search();
        }
    }

    fn reset_search(&mut self) {
        self.search = SearchStateEngine::new(Arc::clone(&self.store));
        self.results.clear();
        self.signed_in = false;
    }

    async fn update_and_show(&mut self, update: FilterUpdate) -> Result<()> {
        self.search.update_filter(update)?;
        self.show_current().await
    }

    async fn show_current(&mut self) -> Result<()> {
        if let Some(view) = self.results.load(self.search.page_key()).await? {
            self.print_view(&view);
        }
        Ok(())
    }

    fn known_total_pages(&self) -> Option<u64> {
        let view = self.results.view();
        let page = view.page?;
        Some(self.search.total_pages(page.total))
    }

    fn print_view(&self, view: &ResultsView) {
        let Some(page) = &view.page else {
            return;
        };
        if view.dogs.is_empty() {
            println!("{}", "No dogs match these filters.".bright_black());
            return;
        }

        for dog in &view.dogs {
            print_dog(dog, self.search.favorites().contains(&dog.id));
        }
        println!(
            "{}",
            format!(
                "Page {} of {} ({} dogs)",
                self.search.cursor().page(),
                self.search.total_pages(page.total),
                page.total
            )
            .bright_black()
        );
    }

    fn print_status(&self) {
        let snapshot = self.session.snapshot();
        match &snapshot.credentials {
            Some(c) => println!("Session: {} <{}>", c.name.bright_cyan(), c.email),
            None if snapshot.authenticated => println!("Session: {}", "authenticated".bright_cyan()),
            None => println!("Session: {}", "not logged in".yellow()),
        }
        if let Some(at) = snapshot.last_validated_at {
            println!("Last checked: {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        if !snapshot.authenticated {
            return;
        }

        let filter = self.search.filter();
        let breeds = if filter.breeds.is_empty() {
            "any".to_string()
        } else {
            filter.breeds.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        println!("Breeds: {}", breeds);
        println!(
            "ZIP: {}",
            filter
                .zip_codes
                .as_ref()
                .map(|z| z.join(", "))
                .unwrap_or_else(|| "any".to_string())
        );
        println!("Age: {}-{}", filter.age_min, filter.age_max);
        println!("Sort: {}  Size: {}  Page: {}", filter.sort, filter.page_size, self.search.cursor().page());
        if let Some(error) = self.search.zip_error() {
            println!("{}", error.red());
        }
        self.print_favorites();
    }

    fn print_favorites(&self) {
        let favorites = self.search.favorites();
        if favorites.is_empty() {
            println!("Favorite: {}", "none".bright_black());
        } else {
            println!("Favorite: {}", favorites.ids().join(", ").bright_yellow());
        }
    }
}

fn print_dog(dog: &Dog, favorite: bool) {
    let marker = if favorite { "★".bright_yellow() } else { " ".normal() };
    println!(
        "{} {} {} ({}, {} yrs, {}) {}",
        marker,
        dog.name.bold(),
        dog.breed.bright_cyan(),
        dog.zip_code,
        dog.age,
        dog.img.bright_black(),
        format!("[{}]", dog.id).bright_black()
    );
}

fn print_error(error: &PawError) {
    tracing::debug!("[Shell] {}", error);
    println!("{}", error.user_message().red());
}
