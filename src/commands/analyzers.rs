use crate::analyzers::AnalyzerRegistry;
use anyhow::Result;
use colored::*;
use std::io::Write;

pub fn list_analyzers(registry: &AnalyzerRegistry, out: &mut impl Write) -> Result<()> {
    let width = registry.names().iter().map(|n| n.len()).max().unwrap_or(0);
    for registration in registry.iter() {
        let name = format!("{:<width$}", registration.name);
        writeln!(out, "{}  {}", name.bold(), registration.description)?;
    }
    Ok(())
}
