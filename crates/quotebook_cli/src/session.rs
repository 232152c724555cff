//! Interactive session: one owner thread handling typed commands and sync results.
//!
//! The ticker, the stdin reader and the fetch workers only produce events;
//! every store mutation happens here, in arrival order. A slow or hanging
//! remote never delays a typed command.

use crate::console::ConsolePresenter;
use anyhow::{Context, Result};
use log::{debug, info};
use quotebook_core::{
    spawn_fetch_into, spawn_push, spawn_ticker_into, QuoteCollection, QuotePresenter,
    QuoteSource, QuoteStore, ReconciliationService, RemoteResult, SlotStore, StoreError, Tick,
};
use std::io::BufRead;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;

const HELP: &str = "commands:
  show                      show a random quote for the current filter
  last                      show the last quote of this session
  filter <category|all>     change and persist the filter, then show
  categories                list filter options
  add <category> | <text>   add a quote
  import <file>             import a JSON array of quotes
  export <file>             export all quotes as JSON
  sync                      reconcile with the server now
  quit                      leave the session";

#[derive(Debug)]
enum Event {
    Tick(Tick),
    Line(String),
    Fetched(RemoteResult<QuoteCollection>),
    InputClosed,
}

fn tick_event(tick: Tick) -> Event {
    Event::Tick(tick)
}

pub struct Session<D: SlotStore, S: SlotStore, Q: QuoteSource> {
    store: QuoteStore<D, S>,
    service: Arc<ReconciliationService<Q>>,
    post_new_quotes: bool,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    fetch_in_flight: bool,
}

impl<D, S, Q> Session<D, S, Q>
where
    D: SlotStore,
    S: SlotStore,
    Q: QuoteSource + Send + Sync + 'static,
{
    pub fn new(
        store: QuoteStore<D, S>,
        service: Arc<ReconciliationService<Q>>,
        post_new_quotes: bool,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel::<Event>();
        Self {
            store,
            service,
            post_new_quotes,
            events_tx,
            events_rx,
            fetch_in_flight: false,
        }
    }

    /// Runs until `quit` or end of input.
    pub fn run(mut self, interval: Duration, sync_on_startup: bool) -> Result<()> {
        let presenter = ConsolePresenter;

        let ticker = spawn_ticker_into(interval, self.events_tx.clone(), tick_event)
            .context("start sync ticker")?;
        spawn_input_reader(self.events_tx.clone()).context("start input reader")?;

        info!("event=session_start module=cli status=ok");
        if sync_on_startup {
            self.request_sync(&presenter);
        }
        let _ = self
            .store
            .show_random(&self.store.effective_selection(), &presenter);
        println!("{HELP}");

        while let Ok(event) = self.events_rx.recv() {
            if !self.handle_event(event, &presenter) {
                break;
            }
        }

        ticker.cancel();
        info!("event=session_end module=cli status=ok");
        Ok(())
    }

    /// Returns `false` when the session should end.
    fn handle_event(&mut self, event: Event, presenter: &dyn QuotePresenter) -> bool {
        match event {
            Event::Tick(tick) => {
                debug!("event=sync_tick module=cli sequence={}", tick.sequence);
                self.request_sync(presenter);
            }
            Event::Line(line) => return self.handle_line(line.trim(), presenter),
            Event::Fetched(fetched) => {
                self.fetch_in_flight = false;
                let _ = self.service.apply(&mut self.store, fetched, presenter);
            }
            Event::InputClosed => return false,
        }
        true
    }

    /// Starts a background fetch unless one is already running.
    fn request_sync(&mut self, presenter: &dyn QuotePresenter) {
        if self.fetch_in_flight {
            debug!("event=sync_request module=cli status=skipped reason=in_flight");
            return;
        }
        match spawn_fetch_into(
            Arc::clone(&self.service),
            self.events_tx.clone(),
            Event::Fetched,
        ) {
            Ok(()) => self.fetch_in_flight = true,
            Err(err) => presenter.render_error(&format!("Sync skipped: {err}")),
        }
    }

    /// Returns `false` when the session should end.
    fn handle_line(&mut self, line: &str, presenter: &dyn QuotePresenter) -> bool {
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map(|(command, rest)| (command, rest.trim()))
            .unwrap_or((line, ""));

        match command {
            "" | "show" => {
                let _ = self
                    .store
                    .show_random(&self.store.effective_selection(), presenter);
            }
            "last" => match self.store.last_shown() {
                Some(quote) => presenter.render(&quote),
                None => presenter.notify("Nothing shown yet in this session."),
            },
            "filter" => match self.store.set_selected_category(rest) {
                Ok(selection) => {
                    let _ = self.store.show_random(&selection, presenter);
                }
                Err(err) => presenter.render_error(&err.to_string()),
            },
            "categories" => presenter.notify(&self.store.category_options().join(", ")),
            "add" => self.add(rest, presenter),
            "import" => {
                if let Err(err) = import_file(&mut self.store, Path::new(rest), presenter) {
                    presenter.render_error(&format!("{err:#}"));
                }
            }
            "export" => {
                if let Err(err) = export_file(&self.store, Path::new(rest), presenter) {
                    presenter.render_error(&format!("{err:#}"));
                }
            }
            "sync" => {
                if self.fetch_in_flight {
                    presenter.notify("A sync is already running.");
                } else {
                    self.request_sync(presenter);
                }
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => return false,
            other => presenter.render_error(&format!("unknown command `{other}`; try `help`")),
        }
        true
    }

    fn add(&mut self, rest: &str, presenter: &dyn QuotePresenter) {
        let Some((category, text)) = rest.split_once('|') else {
            presenter.render_error("usage: add <category> | <text>");
            return;
        };
        match self.store.add(text, category) {
            Ok(quote) => {
                presenter.notify("Quote added successfully!");
                if self.post_new_quotes {
                    if let Err(err) = spawn_push(Arc::clone(&self.service), quote) {
                        log::warn!("event=remote_push module=cli status=error error={err}");
                    }
                }
            }
            Err(err) => presenter.render_error(&err.to_string()),
        }
    }
}

fn spawn_input_reader(events: mpsc::Sender<Event>) -> std::io::Result<()> {
    std::thread::Builder::new()
        .name("quotebook-input".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if events.send(Event::Line(line)).is_err() {
                    return;
                }
            }
            let _ = events.send(Event::InputClosed);
        })?;
    Ok(())
}

/// Reads and imports a JSON file; domain failures are rendered, I/O failures returned.
pub fn import_file<D: SlotStore, S: SlotStore>(
    store: &mut QuoteStore<D, S>,
    path: &Path,
    presenter: &dyn QuotePresenter,
) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read import file `{}`", path.display()))?;
    match store.import_bulk(&raw) {
        Ok(result) => presenter.notify(&format!(
            "Quotes imported successfully! {} added, {} skipped.",
            result.added, result.skipped
        )),
        Err(err @ (StoreError::Format(_) | StoreError::Validation(_))) => {
            presenter.render_error(&format!("Invalid JSON file: {err}"));
        }
        Err(err) => return Err(err).context("persist imported quotes"),
    }
    Ok(())
}

/// Writes the pretty-printed collection to `path`.
pub fn export_file<D: SlotStore, S: SlotStore>(
    store: &QuoteStore<D, S>,
    path: &Path,
    presenter: &dyn QuotePresenter,
) -> Result<()> {
    let bytes = store.export_all().context("serialize quotes")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("write export file `{}`", path.display()))?;
    presenter.notify(&format!(
        "Exported {} quote(s) to {}.",
        store.len(),
        path.display()
    ));
    Ok(())
}
