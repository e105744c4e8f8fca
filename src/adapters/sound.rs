use crate::domain::ports::SoundPlayer;
use crate::utils::error::{Result, ToolError};
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

/// 以命令列播放器播放音效
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSoundPlayer;

fn candidates(path: &Path) -> Vec<(&'static str, Vec<&'static str>)> {
    let is_mp3 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false);

    let mut players = vec![("afplay", vec![])];
    if is_mp3 {
        players.push(("mpg123", vec!["-q"]));
    } else {
        players.push(("paplay", vec![]));
        players.push(("aplay", vec!["-q"]));
    }
    players.push(("ffplay", vec!["-nodisp", "-autoexit", "-loglevel", "quiet"]));
    players
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        for (program, args) in candidates(path) {
            let status = Command::new(program)
                .args(&args)
                .arg(path)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status();
            match status {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => tracing::debug!("{} exited with {}", program, status),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Err(ToolError::Unsupported {
            message: format!("No audio player could play {}", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp3_prefers_mpg123() {
        let names: Vec<&str> = candidates(Path::new("done.MP3")).iter().map(|c| c.0).collect();
        assert!(names.contains(&"mpg123"));
        assert!(!names.contains(&"aplay"));
    }

    #[test]
    fn test_wav_uses_pulse_then_alsa() {
        let names: Vec<&str> = candidates(Path::new("done.wav")).iter().map(|c| c.0).collect();
        assert_eq!(names, vec!["afplay", "paplay", "aplay", "ffplay"]);
    }
}
