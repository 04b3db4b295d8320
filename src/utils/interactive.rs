use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, style,
    terminal::{self, ClearType},
};
use std::io::{self, Write};

pub fn prompt_input(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_string())
}

pub fn prompt_yes_no(prompt: &str) -> Result<bool> {
    loop {
        let input = prompt_input(&format!("{} [y/N]: ", prompt))?;
        match input.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" | "" => return Ok(false),
            _ => println!("Please enter 'y' or 'n'"),
        }
    }
}

/// Arrow-key picker. Returns the chosen index, or `None` on `q`/Esc.
pub fn select_from_list(title: &str, items: &[String]) -> Result<Option<usize>> {
    if items.is_empty() {
        return Ok(None);
    }

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();

    let mut selected = 0;
    let result = loop {
        execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;
        execute!(
            stdout,
            style::Print(title),
            style::Print("\r\n"),
            style::Print("Use arrow keys to navigate, Enter to select, q to quit:\r\n\r\n")
        )?;

        for (i, item) in items.iter().enumerate() {
            if i == selected {
                execute!(
                    stdout,
                    style::SetForegroundColor(style::Color::Blue),
                    style::Print("> "),
                    style::Print(item),
                    style::ResetColor,
                    style::Print("\r\n")
                )?;
            } else {
                execute!(stdout, style::Print("  "), style::Print(item), style::Print("\r\n"))?;
            }
        }

        match event::read() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => match code {
                KeyCode::Up => selected = selected.saturating_sub(1),
                KeyCode::Down => {
                    if selected < items.len() - 1 {
                        selected += 1;
                    }
                }
                KeyCode::Enter => break Ok(Some(selected)),
                KeyCode::Char('q') | KeyCode::Esc => break Ok(None),
                _ => {}
            },
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }
    };

    terminal::disable_raw_mode()?;
    execute!(stdout, terminal::Clear(ClearType::All), cursor::MoveTo(0, 0))?;

    result
}
