use crossbeam_channel::{unbounded, RecvTimeoutError};
use env_logger::{Builder, Env};
use photos_core::{
    controller::PhotosController,
    data::{Config, Photos, Status},
    webapi::WebApi,
};
use std::{env, io, io::BufRead, sync::Arc, thread, time::Duration};

const ENV_LOG: &str = "PHOTOS_LOG";
const ENV_LOG_STYLE: &str = "PHOTOS_LOG_STYLE";

const TICK: Duration = Duration::from_millis(50);

enum Command {
    Reset,
    More,
    Search(String),
    Show(u64),
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        match line.trim_end() {
            "r" => Some(Self::Reset),
            "n" => Some(Self::More),
            "q" => Some(Self::Quit),
            line => {
                if let Some(text) = line.strip_prefix('/') {
                    Some(Self::Search(text.to_owned()))
                } else if let Some(id) = line.strip_prefix('#') {
                    id.trim().parse().ok().map(Self::Show)
                } else {
                    None
                }
            }
        }
    }
}

fn main() {
    Builder::from_env(
        Env::new()
            .filter_or(ENV_LOG, "info")
            .write_style(ENV_LOG_STYLE),
    )
    .init();

    let config = load_config(env::args().skip(1));
    let api = WebApi::with_config(&config);
    let mut controller = PhotosController::new(Arc::new(api), &config);

    let (input_sender, input_receiver) = unbounded();
    let _input_thread = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match Command::parse(&line) {
                Some(cmd) => {
                    if input_sender.send(cmd).is_err() {
                        break;
                    }
                }
                None => log::warn!("unknown command"),
            }
        }
    });

    println!("r: reload, n: next page, /text: search, #id: show photo, q: quit");
    controller.load_page(true);

    loop {
        match input_receiver.recv_timeout(TICK) {
            Ok(Command::Reset) => controller.load_page(true),
            Ok(Command::More) => {
                if !controller.load_more() {
                    log::info!("nothing more to load");
                }
            }
            Ok(Command::Search(text)) => controller.search_input(text),
            Ok(Command::Show(id)) => controller.load_by_id(id),
            Ok(Command::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        if controller.pump() {
            render(controller.photos());
        }
    }
}

/// Loads the saved config.  `--wide` switches to the wide page size.
fn load_config(args: impl Iterator<Item = String>) -> Config {
    let config = Config::load();
    let mut wide = false;
    for arg in args {
        match arg.as_str() {
            "--wide" => wide = true,
            other => log::warn!("ignoring unknown argument {:?}", other),
        }
    }
    if wide {
        config.wide()
    } else {
        config
    }
}

fn render(photos: &Photos) {
    match photos.status() {
        Status::Loading => println!("loading..."),
        Status::Failed => {
            if let Some(err) = photos.error() {
                println!("error: {err}");
            }
        }
        Status::Idle | Status::Succeeded => {}
    }
    for photo in photos.items() {
        println!("{:>5}  {}", photo.id, photo.title);
    }
    println!(
        "{} photos, page {}{}",
        photos.items().len(),
        photos.page(),
        if photos.has_more() { ", more available" } else { "" }
    );
    if let Some(photo) = photos.current_photo() {
        println!("#{} (album {}): {}", photo.id, photo.album_id, photo.title);
        println!("  {}", photo.url);
        println!("  {}", photo.thumbnail_url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert!(matches!(Command::parse("r"), Some(Command::Reset)));
        assert!(matches!(Command::parse("n\r"), Some(Command::More)));
        assert!(matches!(Command::parse("#42"), Some(Command::Show(42))));
        assert!(matches!(
            Command::parse("/qui sunt"),
            Some(Command::Search(text)) if text == "qui sunt"
        ));
        assert!(matches!(Command::parse("/"), Some(Command::Search(text)) if text.is_empty()));
        assert!(Command::parse("#abc").is_none());
        assert!(Command::parse("play").is_none());
    }

    #[test]
    fn wide_flag_selects_larger_pages() {
        let narrow = load_config(std::iter::empty());
        let wide = load_config(["--wide".to_owned()].into_iter());
        assert_eq!(wide.page_size, photos_core::data::WIDE_PAGE_SIZE);
        assert_eq!(wide.search_debounce_ms, narrow.search_debounce_ms);
    }
}
