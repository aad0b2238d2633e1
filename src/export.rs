use crate::calculations::allocation::CollectionTotals;
use crate::entity::{AllocationEntity, AssetKind, AssetsSnapshot};
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

#[derive(Serialize)]
struct KindSheet<'a> {
    entities: &'a [AllocationEntity],
    totals: CollectionTotals,
}

#[derive(Serialize)]
struct AssetsSheet<'a> {
    projects: Vec<String>,
    personnel: KindSheet<'a>,
    equipment: KindSheet<'a>,
}

impl<'a> AssetsSheet<'a> {
    fn from_snapshot(snapshot: &'a AssetsSnapshot) -> Self {
        let sheet = |kind| {
            let entities = snapshot.entities(kind);
            KindSheet {
                entities,
                totals: CollectionTotals::of(entities),
            }
        };
        Self {
            projects: snapshot.project_columns(),
            personnel: sheet(AssetKind::Personnel),
            equipment: sheet(AssetKind::Equipment),
        }
    }
}

pub fn export_assets_to_json<P: AsRef<Path>>(snapshot: &AssetsSnapshot, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &AssetsSheet::from_snapshot(snapshot))?;
    Ok(())
}

/// One row per entity with a column per project, then a `TOTAL` row per kind.
pub fn export_assets_to_csv<P: AsRef<Path>>(snapshot: &AssetsSnapshot, path: P) -> ExportResult<()> {
    let file = File::create(path)?;
    write_assets_csv(snapshot, file)
}

pub fn write_assets_csv<W: io::Write>(snapshot: &AssetsSnapshot, out: W) -> ExportResult<()> {
    let projects = snapshot.project_columns();
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec![
        "kind".to_string(),
        "id".to_string(),
        "name".to_string(),
        "base_value".to_string(),
    ];
    header.extend(projects.iter().cloned());
    header.push("total_percent".to_string());
    header.push("total_amount".to_string());
    writer.write_record(&header)?;

    for kind in AssetKind::all() {
        let entities = snapshot.entities(kind);
        for entity in entities {
            let mut record = vec![
                kind.as_str().to_string(),
                entity.id.to_string(),
                entity.name.clone(),
                entity.base_value().to_string(),
            ];
            record.extend(projects.iter().map(|project| match entity.shares().get(project) {
                Some(value) => value.to_string(),
                None => String::new(),
            }));
            record.push(entity.total_percent().to_string());
            record.push(entity.total_amount().to_string());
            writer.write_record(&record)?;
        }

        let totals = CollectionTotals::of(entities);
        let mut record = vec![
            kind.as_str().to_string(),
            String::new(),
            "TOTAL".to_string(),
            totals.base_total.to_string(),
        ];
        record.extend(projects.iter().map(|_| String::new()));
        record.push(format!("{:.1}", totals.ratio));
        record.push(totals.grand_total.to_string());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
