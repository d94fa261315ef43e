use std::path::Path;

use serde::Serialize;

pub fn dump_data_to_csv<T: Serialize>(data: &[T], path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in data {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
