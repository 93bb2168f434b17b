//! Connection handling: one select loop over server lines and stdin lines.

use crate::console;
use log::info;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

pub struct Client {
    stream: TcpStream,
}

impl Client {
    pub async fn connect(host: &str, port: u16) -> io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        info!("Connected to {}:{}", host, port);
        Ok(Client { stream })
    }

    /// Runs until the user types `exit`, stdin closes, or the server closes
    /// the connection (which it does after the game-complete broadcast).
    pub async fn run(self) -> io::Result<()> {
        let (reader, mut writer) = self.stream.into_split();
        let mut server_lines = BufReader::new(reader).lines();
        let mut stdin_lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                received = server_lines.next_line() => match received? {
                    Some(line) => println!("{}", line),
                    None => {
                        println!("Connection closed by server.");
                        break;
                    }
                },
                typed = stdin_lines.next_line() => match typed? {
                    Some(line) => {
                        let line = line.trim();
                        if line.eq_ignore_ascii_case("exit") {
                            break;
                        }
                        if console::validate(line) {
                            writer.write_all(line.as_bytes()).await?;
                            writer.write_all(b"\n").await?;
                            writer.flush().await?;
                        } else {
                            println!("Invalid input. Try again.");
                        }
                    }
                    None => break,
                },
            }
        }
        Ok(())
    }
}
