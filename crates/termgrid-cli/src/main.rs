use anyhow::{anyhow, Result};
use clap::Parser;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute, queue,
    style::{Print, ResetColor},
    terminal::{self, Clear, ClearType},
};
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use termgrid_core::config::{Config, ConfigData};
use termgrid_core::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "termgrid terminal CLI", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Terminal rows (defaults to current terminal size)
    #[arg(long)]
    rows: Option<u16>,

    /// Terminal columns (defaults to current terminal size)
    #[arg(long)]
    cols: Option<u16>,

    /// Override shell to use (e.g., /bin/sh, /bin/bash)
    #[arg(long)]
    shell: Option<String>,
}

/// One PRINT event straight off the PTY reader thread, wrapped so the
/// render loop can distinguish "apply and redraw" from "the shell exited".
enum PtyEvent {
    Output(Vec<u8>),
    Closed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug { "termgrid=debug" } else { "termgrid=info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting termgrid-cli");

    let (cols, rows) = terminal::size().unwrap_or((80, 24));
    let rows = args.rows.unwrap_or(if rows > 0 { rows } else { 24 });
    let cols = args.cols.unwrap_or(if cols > 0 { cols } else { 80 });
    if rows == 0 || cols == 0 {
        return Err(anyhow!("terminal must have non-zero size"));
    }

    let pty_system = native_pty_system();
    let pair = pty_system.openpty(PtySize {
        rows,
        cols,
        pixel_width: 0,
        pixel_height: 0,
    })?;

    let shell = args.shell.unwrap_or_else(|| std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".into()));
    let child_cmd = CommandBuilder::new(shell);
    let mut child = pair.slave.spawn_command(child_cmd)?;
    drop(pair.slave);

    let pty_writer: Arc<Mutex<Box<dyn Write + Send>>> = Arc::new(Mutex::new(pair.master.take_writer()?));
    let mut pty_reader = pair.master.try_clone_reader()?;

    let data = ConfigData {
        rows,
        cols,
        ..ConfigData::default()
    };
    let mut config = Config::new(data);
    let response_writer = pty_writer.clone();
    config.outbound_sink = Some(Box::new(move |bytes| match response_writer.lock() {
        Ok(mut writer) => writer.write_all(bytes).is_ok(),
        Err(_) => false,
    }));
    let mut term = Terminal::new(config);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), Hide)?;

    let (output_tx, mut output_rx) = mpsc::channel::<PtyEvent>(256);
    std::thread::spawn(move || {
        let mut buf = [0u8; 4096];
        loop {
            match pty_reader.read(&mut buf) {
                Ok(0) => {
                    let _ = output_tx.blocking_send(PtyEvent::Closed);
                    break;
                }
                Ok(n) => {
                    if output_tx.blocking_send(PtyEvent::Output(buf[..n].to_vec())).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("pty read error: {}", e);
                    let _ = output_tx.blocking_send(PtyEvent::Closed);
                    break;
                }
            }
        }
    });

    let (input_tx, mut input_rx) = mpsc::channel::<InputEvent>(256);
    let input_task = tokio::task::spawn_blocking(move || read_input(input_tx));

    render(&mut stdout, &term)?;

    'main: loop {
        tokio::select! {
            event = output_rx.recv() => {
                match event {
                    Some(PtyEvent::Output(bytes)) => {
                        term.feed(&bytes);
                        render(&mut stdout, &term)?;
                    }
                    Some(PtyEvent::Closed) | None => {
                        info!("pty closed");
                        break 'main;
                    }
                }
            }
            event = input_rx.recv() => {
                match event {
                    Some(InputEvent::Bytes(bytes)) => {
                        if let Ok(mut writer) = pty_writer.lock() {
                            let _ = writer.write_all(&bytes);
                        }
                    }
                    Some(InputEvent::Resize { rows, cols }) => {
                        let _ = pair.master.resize(PtySize { rows, cols, pixel_width: 0, pixel_height: 0 });
                        if let Err(e) = term.resize(rows, cols) {
                            debug!("resize rejected: {}", e);
                        }
                        render(&mut stdout, &term)?;
                    }
                    Some(InputEvent::Quit) | None => {
                        info!("quit requested");
                        break 'main;
                    }
                }
            }
        }
    }

    input_task.abort();
    let _ = child.kill();
    execute!(stdout, Show, ResetColor)?;
    terminal::disable_raw_mode()?;
    debug!("metrics at exit: {:?}", term.metrics());

    Ok(())
}

enum InputEvent {
    Bytes(Vec<u8>),
    Resize { rows: u16, cols: u16 },
    Quit,
}

/// Blocking crossterm input loop, run on a dedicated thread. `portable-pty`
/// and `crossterm` both expect synchronous I/O here; `tokio::select!` only
/// needs the channel on the other end.
fn read_input(tx: mpsc::Sender<InputEvent>) {
    loop {
        let polled = match event::poll(std::time::Duration::from_millis(100)) {
            Ok(polled) => polled,
            Err(_) => break,
        };
        if !polled {
            continue;
        }
        let ev = match event::read() {
            Ok(ev) => ev,
            Err(_) => break,
        };
        let sent = match ev {
            Event::Key(KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x03]))
            }
            Event::Key(KeyEvent { code: KeyCode::Char(c), .. }) => {
                let mut buf = [0u8; 4];
                tx.blocking_send(InputEvent::Bytes(c.encode_utf8(&mut buf).as_bytes().to_vec()))
            }
            Event::Key(KeyEvent { code: KeyCode::Enter, .. }) => tx.blocking_send(InputEvent::Bytes(vec![b'\r'])),
            Event::Key(KeyEvent { code: KeyCode::Tab, .. }) => tx.blocking_send(InputEvent::Bytes(vec![b'\t'])),
            Event::Key(KeyEvent { code: KeyCode::Backspace, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x7f]))
            }
            Event::Key(KeyEvent { code: KeyCode::Up, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x1b, b'[', b'A']))
            }
            Event::Key(KeyEvent { code: KeyCode::Down, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x1b, b'[', b'B']))
            }
            Event::Key(KeyEvent { code: KeyCode::Right, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x1b, b'[', b'C']))
            }
            Event::Key(KeyEvent { code: KeyCode::Left, .. }) => {
                tx.blocking_send(InputEvent::Bytes(vec![0x1b, b'[', b'D']))
            }
            Event::Key(KeyEvent { code: KeyCode::Esc, .. }) => tx.blocking_send(InputEvent::Bytes(vec![0x1b])),
            Event::Resize(cols, rows) => tx.blocking_send(InputEvent::Resize { rows, cols }),
            _ => Ok(()),
        };
        if sent.is_err() {
            let _ = tx.blocking_send(InputEvent::Quit);
            break;
        }
    }
}

/// Paint one frame: home the cursor, print each row's glyphs, then place the
/// resolved caret (spec.md §4.6/§4.7) — never the raw VT cursor position.
fn render(stdout: &mut io::Stdout, term: &Terminal) -> Result<()> {
    let frame = term.snapshot();
    queue!(stdout, MoveTo(0, 0))?;
    for row in 0..term.size().rows {
        queue!(stdout, MoveTo(0, row))?;
        let line: String = frame.row(row).iter().map(|c| c.ch).collect();
        queue!(stdout, Print(line))?;
    }
    if frame.caret_visible {
        queue!(stdout, MoveTo(frame.caret_col, frame.caret_row), Show)?;
    } else {
        queue!(stdout, Hide)?;
    }
    stdout.flush()?;
    Ok(())
}
