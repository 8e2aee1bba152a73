// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use core::num::{NonZeroU16, NonZeroU32};
use fn_plotter::{
    app::{Config, Event, Key, Outcome, Screen, Session, ViewerScreen},
    render::{self, Frame, Legend},
    shell::{self, Command},
    svg::SvgCanvas,
    Number, Point,
};
use log::info;
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::ExitCode,
};

const TIPS: &str = "arrows/hjkl: pan  back: edit  quit: exit";

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    session: Session,
    /// Where the current viewer's frames go.
    svg_path: Option<String>,
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        session: Session::new(Config::default()),
        svg_path: None,
    };

    let mut stdout = BufWriter::new(stdout());
    writeln!(stdout, r#"enter a function of x, or "help" for help"#)?;
    loop {
        let prompt = match state.session.screen() {
            Screen::Input(_) => "f(x) = ",
            Screen::Viewer(_) => "> ",
        };
        let line = shell::input(&mut stdout, prompt)?;
        let on_input = matches!(state.session.screen(), Screen::Input(_));

        let cmd = line
            .to_ascii_lowercase()
            .parse::<Command>()
            .ok()
            .filter(|cmd| !on_input || cmd.on_input_screen());
        match cmd {
            Some(Command::Help) => {
                for c in Command::exhaustive() {
                    if !on_input || c.on_input_screen() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }
                if on_input {
                    writeln!(stdout, "anything else is read as a function of x")?;
                }
            }

            Some(Command::Quit) => break,

            Some(Command::SetWin) => {
                set_win(&mut stdout, &mut state.session)?;
                redraw(&mut stdout, &state)?;
            }

            Some(Command::Pan(dir)) => {
                state.session.handle(Event::Key(dir.key()));
                redraw(&mut stdout, &state)?;
            }

            Some(Command::Back) => {
                if state.session.handle(Event::Key(Key::Escape)) == Outcome::LeftViewer {
                    state.svg_path = None;
                    if let Screen::Input(input) = state.session.screen() {
                        writeln!(stdout, "f(x) was {}", input.text())?;
                    }
                }
            }

            Some(Command::PrintTree) => {
                if let Screen::Viewer(viewer) = state.session.screen() {
                    shell::dump_tree(
                        &mut stdout,
                        viewer.function().expr(),
                        format_args!("f(x) = {}", viewer.function().src()),
                    )?;
                }
            }

            None if on_input => {
                state.session.handle(Event::Text(line));
                match state.session.handle(Event::Key(Key::Enter)) {
                    Outcome::EnteredViewer => {
                        state.svg_path = Some(output_svg_filename(Local::now()));
                        redraw(&mut stdout, &state)?;
                    }
                    _ => {
                        if let Screen::Input(input) = state.session.screen() {
                            if let Some(err) = input.error() {
                                writeln!(stdout)?;
                                shell::report_submit_err(
                                    &mut stdout,
                                    err,
                                    state.session.idents(),
                                )?;
                            }
                        }
                    }
                }
            }

            None => {
                writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
            }
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn set_win<W: Write>(mut out: W, session: &mut Session) -> anyhow::Result<()> {
    let mut config = session.config().clone();
    writeln!(out, "config = {config:#}")?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    for (name, dst) in [
        ("x min", &mut config.x.start),
        ("x max", &mut config.x.end),
        ("y min", &mut config.y.start),
        ("y max", &mut config.y.end),
        ("pan step", &mut config.pan_step),
        ("grid gap", &mut config.grid_gap),
    ] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) => *dst = new,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    writeln!(out, "note: resolution and pixel size must be nonzero integers")?;
    match shell::read_fromstr::<_, NonZeroU16>(
        &mut out,
        format_args!("?resolution (is {}) = ", config.resolution),
        true,
    )? {
        Ok(Some(new)) => config.resolution = new,
        Ok(None) => {}
        Err(_) => return Ok(()),
    }
    match shell::read_fromstr::<_, NonZeroU32>(
        &mut out,
        format_args!("?pixel size (is {}) = ", config.pixel_size),
        true,
    )? {
        Ok(Some(new)) => config.pixel_size = new,
        Ok(None) => {}
        Err(_) => return Ok(()),
    }

    if let Err(err) = config.viewport() {
        writeln!(out, "error: {err}")?;
        return Ok(());
    }
    if !config.pan_step.is_finite() {
        writeln!(out, "error: pan step must be a finite number")?;
        return Ok(());
    }
    info!("config changed to {config}");
    session.set_config(config);
    writeln!(out, "note: new settings apply the next time a function is plotted")?;
    Ok(())
}

fn redraw<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let (Screen::Viewer(viewer), Some(path)) = (state.session.screen(), &state.svg_path) else {
        return Ok(());
    };
    write_frame(path, viewer)?;
    writeln!(out, "{}", viewer.viewport())?;
    writeln!(out, "wrote {path}")?;
    Ok(())
}

fn write_frame(path: &str, viewer: &ViewerScreen) -> anyhow::Result<()> {
    let config = viewer.config();
    let [width, height] = config.canvas;
    let canvas_size = Point::new(Number::from(width), Number::from(height));
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .context("failed to open output svg file")?;

    let mut svg = SvgCanvas::begin(BufWriter::new(file), canvas_size)
        .context("failed to write to output svg file")?;
    render::draw_frame(
        &mut svg,
        canvas_size,
        &Frame {
            viewport: viewer.viewport(),
            series: viewer.series(),
            grid_gap: config.grid_gap,
            legend: Some(Legend {
                expr: viewer.function().src(),
                tips: TIPS,
            }),
        },
    )
    .context("failed to write to output svg file")?;
    let mut file = svg.finish().context("failed to write to output svg file")?;
    file.flush()?;
    file.get_mut()
        .sync_data()
        .context("failed to sync output svg file")?;
    info!("wrote frame to {path}");
    Ok(())
}
