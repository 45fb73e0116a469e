// mod.rs - Output formatters module

use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::{DistanceMatrix, MergeStep, Recommendation};

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &Path) -> Result<(), String> {
    if let Some(parent) = file_path.parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

fn create_writer(file_path: &Path) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path.display(), e))?;
    Ok(BufWriter::new(file))
}

fn write_err(e: std::io::Error) -> String {
    format!("Write error: {}", e)
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Write a labelled matrix with `separator` between cells
fn write_delimited(
    file_path: &Path,
    separator: char,
    labels: &[String],
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    if labels.len() != matrix.len() {
        return Err(format!(
            "Cannot write matrix: {} labels for {} rows",
            labels.len(),
            matrix.len()
        ));
    }

    let mut writer = create_writer(file_path)?;

    writeln!(writer, "# Command: {}", command_line).map_err(write_err)?;
    writeln!(writer, "# Generated: {}", generated_at()).map_err(write_err)?;
    writeln!(writer, "# presurvey v{}", env!("CARGO_PKG_VERSION")).map_err(write_err)?;
    writeln!(writer, "# Rows are references, columns are queries").map_err(write_err)?;

    write!(writer, "Reference").map_err(write_err)?;
    for label in labels {
        write!(writer, "{}{}", separator, label).map_err(write_err)?;
    }
    writeln!(writer).map_err(write_err)?;

    for (label, row) in labels.iter().zip(matrix.rows()) {
        write!(writer, "{}", label).map_err(write_err)?;
        for distance in row {
            write!(writer, "{}{}", separator, distance).map_err(write_err)?;
        }
        writeln!(writer).map_err(write_err)?;
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Distance matrix written to: {}", file_path.display());
    Ok(())
}

/// Write distance matrix in the specified format
pub fn write_matrix(
    file_path: &Path,
    format: &str,
    labels: &[String],
    matrix: &DistanceMatrix,
    command_line: &str,
) -> Result<(), String> {
    match format.to_lowercase().as_str() {
        "tsv" => write_delimited(file_path, '\t', labels, matrix, command_line),
        "csv" => write_delimited(file_path, ',', labels, matrix, command_line),
        _ => Err(format!("Unsupported matrix format: {}. Use: tsv, csv", format)),
    }
}

/// Console/text rendering of the combinations
pub fn format_groupings(labels: &[String], names: &[String], combinations: &[Vec<usize>]) -> String {
    let mut out = String::new();
    for (i, combination) in combinations.iter().enumerate() {
        out.push_str(&format!("Group{}\n", i + 1));
        for &member in combination {
            let label = labels.get(member).map(String::as_str).unwrap_or("?");
            let name = names.get(member).map(String::as_str).unwrap_or("?");
            out.push_str(&format!("{: <4}: {}\n", label, name));
        }
    }
    out
}

pub fn print_groupings(labels: &[String], names: &[String], combinations: &[Vec<usize>]) {
    println!("\n🧪 Recommended combinations:");
    print!("{}", format_groupings(labels, names, combinations));
}

#[derive(Serialize)]
struct GroupMember<'a> {
    index: usize,
    label: &'a str,
    name: &'a str,
}

#[derive(Serialize)]
struct GroupingReport<'a> {
    version: &'static str,
    generated: String,
    score_threshold: f64,
    families: Vec<Vec<GroupMember<'a>>>,
    combinations: Vec<Vec<GroupMember<'a>>>,
    merge_history: &'a [MergeStep],
}

fn members<'a>(indices: &[usize], labels: &'a [String], names: &'a [String]) -> Vec<GroupMember<'a>> {
    indices
        .iter()
        .map(|&index| GroupMember {
            index,
            label: labels.get(index).map(String::as_str).unwrap_or("?"),
            name: names.get(index).map(String::as_str).unwrap_or("?"),
        })
        .collect()
}

/// Write the recommended combinations as `txt` or `json`
pub fn write_groupings(
    file_path: &Path,
    format: &str,
    labels: &[String],
    names: &[String],
    recommendation: &Recommendation,
    score_threshold: f64,
) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;

    match format.to_lowercase().as_str() {
        "txt" => {
            writeln!(writer, "# Generated: {}", generated_at()).map_err(write_err)?;
            writeln!(writer, "# presurvey v{}", env!("CARGO_PKG_VERSION")).map_err(write_err)?;
            writeln!(writer, "# Score threshold: {}", score_threshold).map_err(write_err)?;
            writeln!(writer, "# Families:").map_err(write_err)?;
            for family in &recommendation.families {
                let family_labels: Vec<&str> = family
                    .iter()
                    .map(|&i| labels.get(i).map(String::as_str).unwrap_or("?"))
                    .collect();
                writeln!(writer, "#   {}", family_labels.join(", ")).map_err(write_err)?;
            }
            write!(
                writer,
                "{}",
                format_groupings(labels, names, &recommendation.combinations)
            )
            .map_err(write_err)?;
        }
        "json" => {
            let report = GroupingReport {
                version: env!("CARGO_PKG_VERSION"),
                generated: generated_at(),
                score_threshold,
                families: recommendation
                    .families
                    .iter()
                    .map(|f| members(f, labels, names))
                    .collect(),
                combinations: recommendation
                    .combinations
                    .iter()
                    .map(|c| members(c, labels, names))
                    .collect(),
                merge_history: &recommendation.merge_history,
            };
            serde_json::to_writer_pretty(&mut writer, &report)
                .map_err(|e| format!("Failed to serialize grouping report: {}", e))?;
            writeln!(writer).map_err(write_err)?;
        }
        _ => {
            return Err(format!(
                "Unsupported report format: {}. Use: txt, json",
                format
            ))
        }
    }

    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Groupings written to: {}", file_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::recommend_combinations;
    use tempfile::tempdir;

    fn labels() -> Vec<String> {
        vec!["P1".into(), "P2".into(), "P3".into(), "P4".into()]
    }

    fn names() -> Vec<String> {
        vec!["a.fa".into(), "b.fa".into(), "c.fa".into(), "d.fa".into()]
    }

    fn recommendation() -> Recommendation {
        let raw = DistanceMatrix::from_rows(vec![
            vec![0, 2, 20, 20],
            vec![2, 0, 20, 20],
            vec![20, 20, 0, 2],
            vec![20, 20, 2, 0],
        ])
        .unwrap();
        recommend_combinations(&raw, 10.0).unwrap()
    }

    #[test]
    fn test_format_groupings() {
        let text = format_groupings(&labels(), &names(), &[vec![0, 2], vec![1, 3]]);
        assert_eq!(
            text,
            "Group1\nP1  : a.fa\nP3  : c.fa\nGroup2\nP2  : b.fa\nP4  : d.fa\n"
        );
    }

    #[test]
    fn test_write_matrix_formats() {
        let dir = tempdir().unwrap();
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 7], vec![9, 0]]).unwrap();
        let two = vec!["P1".to_string(), "P2".to_string()];

        let tsv = dir.path().join("out/matrix.tsv");
        write_matrix(&tsv, "tsv", &two, &matrix, "presurvey test").unwrap();
        let content = std::fs::read_to_string(&tsv).unwrap();
        let rows: Vec<&str> = content.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(rows, vec!["Reference\tP1\tP2", "P1\t0\t7", "P2\t9\t0"]);
        assert!(content.starts_with("# Command: presurvey test"));

        let csv = dir.path().join("matrix.csv");
        write_matrix(&csv, "CSV", &two, &matrix, "x").unwrap();
        let content = std::fs::read_to_string(&csv).unwrap();
        assert!(content.contains("P2,9,0"));

        assert!(write_matrix(&csv, "phylip", &two, &matrix, "x").is_err());
        assert!(write_matrix(&csv, "tsv", &two[..1], &matrix, "x").is_err());
    }

    #[test]
    fn test_write_groupings() {
        let dir = tempdir().unwrap();
        let rec = recommendation();

        let txt = dir.path().join("groups.txt");
        write_groupings(&txt, "txt", &labels(), &names(), &rec, 10.0).unwrap();
        let content = std::fs::read_to_string(&txt).unwrap();
        assert!(content.contains("#   P1, P2"));
        assert!(content.contains("Group2\nP2  : b.fa\nP4  : d.fa\n"));

        let json = dir.path().join("groups.json");
        write_groupings(&json, "json", &labels(), &names(), &rec, 10.0).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["combinations"][0][1]["label"], "P3");
        assert_eq!(value["families"].as_array().unwrap().len(), 2);
        assert_eq!(value["merge_history"][2]["distance"], 20);

        assert!(write_groupings(&json, "xml", &labels(), &names(), &rec, 10.0).is_err());
    }
}
