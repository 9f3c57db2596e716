use crate::events::{AppEvent, Command};
use crate::ring::Viewport;
use crate::sys::SharedFrame;
use async_channel::Sender;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;

pub async fn run_server(
    socket_path: &Path,
    tx: Sender<AppEvent>,
    viewport: Viewport,
    frame: SharedFrame,
) {
    // Cleanup old socket if it exists
    if fs_err::metadata(socket_path).is_ok() {
        let _ = fs_err::remove_file(socket_path);
    }

    let listener = match UnixListener::bind(socket_path) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket {}: {}", socket_path.display(), e);
            return;
        }
    };
    log::info!("Listening on {}", socket_path.display());

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                let viewport = viewport.clone();
                let frame = frame.clone();
                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let mut lines = BufReader::new(read_half).lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        let reply = match line.parse::<Command>() {
                            Ok(Command::Event(event)) => {
                                if tx.send(AppEvent::Input(event)).await.is_err() {
                                    break;
                                }
                                None
                            }
                            Ok(Command::Resize(width)) => {
                                viewport.resize(width);
                                None
                            }
                            Ok(Command::Status) => Some(status_line(&frame)),
                            Err(e) => {
                                log::warn!("Ignoring command '{}': {}", line.trim(), e);
                                None
                            }
                        };

                        if let Some(reply) = reply
                            && write_half
                                .write_all(format!("{reply}\n").as_bytes())
                                .await
                                .is_err()
                        {
                            break;
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

fn status_line(frame: &SharedFrame) -> String {
    frame.read().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::CarouselEvent;
    use crate::ring::{Carousel, Settings};
    use parking_lot::RwLock;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::UnixStream;

    #[tokio::test]
    async fn test_malformed_lines_are_ignored() {
        let carousel =
            Carousel::new(Config::default().items(), Settings::default(), Some(1280.0)).unwrap();
        let frame: SharedFrame = Arc::new(RwLock::new(carousel.frame()));
        let viewport = Viewport::new(1280.0);
        let (tx, rx) = async_channel::unbounded::<AppEvent>();
        let socket =
            std::env::temp_dir().join(format!("orrery-server-{}.sock", std::process::id()));

        let server = tokio::spawn({
            let socket = socket.clone();
            let viewport = viewport.clone();
            let frame = frame.clone();
            async move { run_server(&socket, tx, viewport, frame).await }
        });

        let mut stream = None;
        for _ in 0..100 {
            if let Ok(s) = UnixStream::connect(&socket).await {
                stream = Some(s);
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let (read_half, mut write_half) = stream.expect("server never bound").into_split();

        write_half
            .write_all(b"spin 3\ndrag 20\nresize 500\nstatus\n")
            .await
            .unwrap();
        let mut lines = BufReader::new(read_half).lines();
        let reply = lines.next_line().await.unwrap().unwrap();
        assert_eq!(reply, frame.read().to_string());

        assert_eq!(
            rx.recv().await.unwrap(),
            AppEvent::Input(CarouselEvent::DragMove { delta_x: 20.0 })
        );
        assert!(rx.is_empty());
        assert_eq!(viewport.width(), 500.0);

        server.abort();
        let _ = fs_err::remove_file(&socket);
    }
}
