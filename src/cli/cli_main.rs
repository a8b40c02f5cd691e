use super::cli_reactants::{
    describe_reactants, parse_parameter_line, parse_reactant_line, parse_row_index,
};
use crate::form::page::Page;
use crate::page_config::PageConfigManager;
use log::{error, info};
use std::fs;
use std::io::{self, BufRead, Write};

pub fn run_interactive_menu(mut page: Page, mut manager: PageConfigManager) {
    run_menu(&mut page, &mut manager, &mut io::stdin().lock());
}

/// Menu loop over `input`; returns on "0", at end of input or when reading fails.
pub fn run_menu(page: &mut Page, manager: &mut PageConfigManager, input: &mut impl BufRead) {
    loop {
        show_main_menu(page);
        let choice = match read_user_line(input) {
            Ok(Some(choice)) => choice,
            Ok(None) => {
                println!();
                info!("end of input, leaving the menu");
                break;
            }
            Err(e) => {
                error!("cannot read input: {}", e);
                break;
            }
        };

        let result = match choice.trim() {
            "1" => add_row(page),
            "2" => fill_row(page, input),
            "3" => remove_row(page, input),
            "4" => set_parameter(page, input),
            "5" => render_summary(page),
            "6" => page.clear_summary().map_err(|e| e.to_string()),
            "7" => export_page(page, manager),
            "8" => print_payload(page),
            "9" => change_output_file(manager, input),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => {
                println!("Invalid choice. Please try again.");
                Ok(())
            }
        };
        if let Err(e) = result {
            println!("\x1b[31mError: {}\x1b[0m", e);
        }
    }
}
/* colors
Blue (\x1b[34m) - header text
Yellow (\x1b[33m) - Menu options
Cyan (\x1b[36m) - "Enter your choice:" prompt
Red (\x1b[31m) - errors
Reset (\x1b[0m)
*/
fn show_main_menu(page: &Page) {
    let rows = page.reactant_row_count().unwrap_or(0);
    println!("\x1b[34m\n Reaction data entry ({} reactant rows)\n\x1b[0m", rows);
    println!("\x1b[33m1. Add reactant row\x1b[0m");
    println!("\x1b[33m2. Fill reactant row\x1b[0m");
    println!("\x1b[33m3. Remove reactant row\x1b[0m");
    println!("\x1b[33m4. Set general parameter\x1b[0m");
    println!("\x1b[33m5. Show data to submit\x1b[0m");
    println!("\x1b[33m6. Correct parameters (clear summary)\x1b[0m");
    println!("\x1b[33m7. Export page as HTML\x1b[0m");
    println!("\x1b[33m8. Print submission payload (JSON)\x1b[0m");
    println!("\x1b[33m9. Change export file\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    // a failed flush only delays the prompt
    let _ = io::stdout().flush();
}

/// `Ok(None)` at end of input
fn read_user_line(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

fn ask(input: &mut impl BufRead, text: &str) -> Result<String, String> {
    prompt(text);
    read_user_line(input)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "end of input".to_string())
}

fn add_row(page: &mut Page) -> Result<(), String> {
    let count = page.add_reactant_row().map_err(|e| e.to_string())?;
    println!("Reactant row {} added", count - 1);
    Ok(())
}

fn fill_row(page: &mut Page, input: &mut impl BufRead) -> Result<(), String> {
    let line = ask(input, "<row> <name> <value> <unit> <kind>: ")?;
    let (index, row) = parse_reactant_line(&line)?;
    page.fill_reactant(index, &row).map_err(|e| e.to_string())
}

fn remove_row(page: &mut Page, input: &mut impl BufRead) -> Result<(), String> {
    let index = parse_row_index(&ask(input, "Row to remove: ")?)?;
    page.remove_reactant_row(index).map_err(|e| e.to_string())
}

fn set_parameter(page: &mut Page, input: &mut impl BufRead) -> Result<(), String> {
    let line = ask(input, "<name> = <value>: ")?;
    let (name, value) =
        parse_parameter_line(&line).ok_or_else(|| format!("expected '<name> = <value>', got '{}'", line.trim()))?;
    page.set_parameter(&name, &value).map_err(|e| e.to_string())
}

fn render_summary(page: &mut Page) -> Result<(), String> {
    let input = page.render_summary().map_err(|e| e.to_string())?;
    input.pretty_print().map_err(|e| e.to_string())?;
    for line in describe_reactants(&input) {
        info!("{}", line);
    }
    Ok(())
}

fn export_page(page: &Page, manager: &PageConfigManager) -> Result<(), String> {
    let path = &manager.get_config().output_file;
    fs::write(path, page.to_html()).map_err(|e| format!("cannot write {}: {}", path, e))?;
    println!("Page written to {}", path);
    Ok(())
}

fn print_payload(page: &Page) -> Result<(), String> {
    let input = page.grab().map_err(|e| e.to_string())?;
    println!("{}", input.to_json().map_err(|e| e.to_string())?);
    Ok(())
}

fn change_output_file(
    manager: &mut PageConfigManager,
    input: &mut impl BufRead,
) -> Result<(), String> {
    let path = ask(input, "Export file: ")?;
    let path = path.trim();
    if path.is_empty() {
        return Err("export file name is empty".to_string());
    }
    manager.set_output_file(path).map_err(|e| e.to_string())?;
    println!("Export file set to {} (saved in {})", path, manager.config_file());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_config::PageConfig;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn manager_in(dir: &tempfile::TempDir) -> PageConfigManager {
        let path = dir.path().join("page_config.json");
        PageConfigManager::with_config_file(path.to_str().unwrap())
    }

    #[test]
    fn test_read_user_line_reports_end_of_input() {
        let mut reader = Cursor::new("5\n\n0");
        assert_eq!(read_user_line(&mut reader).unwrap(), Some("5\n".to_string()));
        assert_eq!(read_user_line(&mut reader).unwrap(), Some("\n".to_string()));
        assert_eq!(read_user_line(&mut reader).unwrap(), Some("0".to_string()));
        assert_eq!(read_user_line(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_menu_stops_at_end_of_input() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(&dir);
        let mut page = Page::standard(PageConfig::default());
        let mut input = Cursor::new("1\n1\n2\n0 Glucose 5 mmol/L substrate\nbogus\n");
        run_menu(&mut page, &mut manager, &mut input);
        assert_eq!(page.reactant_row_count().unwrap(), 2);
        assert_eq!(page.grab().unwrap().reactant_name, vec!["Glucose", ""]);
    }

    #[test]
    fn test_prompt_at_end_of_input_does_not_loop() {
        let dir = tempdir().unwrap();
        let mut manager = manager_in(&dir);
        let mut page = Page::standard(PageConfig::default());
        let mut input = Cursor::new("1\n3\n");
        run_menu(&mut page, &mut manager, &mut input);
        assert_eq!(page.reactant_row_count().unwrap(), 1);
    }
}
