use clap::Parser;
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use syllabus_quiz::{
    handle_key, logger, spawn_request, ui, App, Args, HttpQuizService, QuizController,
    QuizService, ServiceRequest, ServiceResponse,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_path() {
        logger::init(path);
    }
    logger::log(&format!("Starting against {}", args.server_url));

    let service: Arc<dyn QuizService> =
        Arc::new(HttpQuizService::new(args.server_url.clone()).map_err(io::Error::other)?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &args, service).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        logger::log(&format!("Exited with error: {}", e));
    }
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    args: &Args,
    service: Arc<dyn QuizService>,
) -> io::Result<()> {
    let (tx, mut rx): (UnboundedSender<ServiceResponse>, UnboundedReceiver<ServiceResponse>) =
        mpsc::unbounded_channel();
    let mut events = EventStream::new();
    let mut app = App::new(QuizController::new(args.questions));

    if let Some(path) = &args.document {
        app.view.path_input = path.display().to_string();
        let request = app.open_document(path);
        dispatch(&service, request, &tx);
    }

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, &app))?;

        tokio::select! {
            event = events.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    let request = handle_key(&mut app, key);
                    dispatch(&service, request, &tx);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(response) = rx.recv() => {
                if !app.controller.apply(response) {
                    logger::log("Ignored stale service response");
                }
                app.sync_view();
            }
        }
    }

    logger::log("Quitting");
    Ok(())
}

fn dispatch(
    service: &Arc<dyn QuizService>,
    request: Option<ServiceRequest>,
    tx: &UnboundedSender<ServiceResponse>,
) {
    if let Some(request) = request {
        spawn_request(service.clone(), request, tx.clone());
    }
}
