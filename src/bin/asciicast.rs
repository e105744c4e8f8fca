use clap::{CommandFactory, Parser};
use cli_toolbox::config::cli::{AsciicastArgs, AsciicastCommand};
use cli_toolbox::core::asciicast::{self, info_lines, validate_speed};
use cli_toolbox::utils::logger;
use cli_toolbox::Result;

#[tokio::main]
async fn main() {
    let args = AsciicastArgs::parse();
    logger::init_cli_logger(args.verbose);

    let Some(command) = args.command else {
        let _ = AsciicastArgs::command().print_help();
        return;
    };

    if let Err(e) = run(command).await {
        let exit_code = e.report();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(command: AsciicastCommand) -> Result<()> {
    match command {
        AsciicastCommand::Rec { output, shell } => {
            println!("Recording session to {}", output.display());
            println!("Type 'exit' or press Ctrl+D to stop recording");
            // PTY 讀寫為阻塞操作
            let saved = output.clone();
            tokio::task::spawn_blocking(move || asciicast::record(&output, shell))
                .await
                .map_err(cli_toolbox::ToolError::pty)??;
            println!("\r\nRecording saved to {}", saved.display());
        }
        AsciicastCommand::Play { input, speed } => {
            validate_speed(speed)?;
            let recording = asciicast::load(&input)?;
            println!("Playing {}", input.display());
            println!("Press Ctrl+C to stop playback");

            let mut stdout = std::io::stdout();
            tokio::select! {
                played = asciicast::play(&recording, speed, &mut stdout) => played?,
                _ = tokio::signal::ctrl_c() => println!("\nPlayback stopped"),
            }
            println!("\nPlayback finished");
        }
        AsciicastCommand::Info { input } => {
            let recording = asciicast::load(&input)?;
            for line in info_lines(&input, &recording) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}
