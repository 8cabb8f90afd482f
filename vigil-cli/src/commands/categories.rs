// vigil-cli/src/commands/categories.rs
//
// Lists the check categories with their mandatory flag and the standards
// that depend on them.

use crate::cli::CategoriesArgs;
use crate::commands::load_config;
use crate::error::CliResult;
use crate::output::print_section;
use console::style;
use vigil_core::{Category, Standard};

/// One row of the category listing.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: Category,
    pub mandatory: bool,
    pub standards: Vec<Standard>,
}

pub fn category_rows(mandatory: &[Category]) -> Vec<CategoryRow> {
    Category::ALL
        .iter()
        .map(|&category| CategoryRow {
            category,
            mandatory: mandatory.contains(&category),
            standards: Standard::ALL
                .iter()
                .copied()
                .filter(|s| s.required_category() == category)
                .collect(),
        })
        .collect()
}

pub fn run_categories(args: CategoriesArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let rows = category_rows(&config.mandatory()?);

    print_section("Categories");
    for row in rows {
        let flag = if row.mandatory { " (mandatory)" } else { "" };
        println!("  {}{}", style(row.category.name()).bold(), style(flag).yellow());
        println!("      {}", row.category.description());
        if !row.standards.is_empty() {
            let names: Vec<&str> = row.standards.iter().map(|s| s.name()).collect();
            println!("      standards: {}", names.join(", "));
        }
    }
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_every_category() {
        let rows = category_rows(&[Category::Flash]);
        assert_eq!(rows.len(), Category::ALL.len());
        assert!(rows[0].mandatory);
        assert!(rows[1..].iter().all(|r| !r.mandatory));

        let flash = &rows[0];
        assert!(flash.standards.contains(&Standard::ItuBt1702));
        assert!(flash.standards.contains(&Standard::Wcag231));

        let loudness = rows.iter().find(|r| r.category == Category::Loudness).unwrap();
        assert_eq!(loudness.standards, vec![Standard::EbuR128, Standard::AtscA85]);
    }
}
