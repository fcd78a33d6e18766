#![no_main]
use libfuzzer_sys::fuzz_target;
use xlmodel::{open_workbook_with_options, ParseOptions};

fuzz_target!(|data: &[u8]| {
    let Ok(dir) = tempfile::tempdir() else {
        return;
    };
    let file_name = dir.path().join("fuzz.xlsx");
    if std::fs::write(&file_name, data).is_err() {
        return;
    }
    let options = ParseOptions::default().work_dir(dir.path());
    let workbook = match open_workbook_with_options(&file_name, &options) {
        Ok(workbook) => workbook,
        Err(_) => return,
    };
    for sheet in &workbook.worksheets {
        let _ = sheet.dimensions();
        for cell in sheet.cells() {
            let _ = cell.reference();
            let _ = workbook.styles.cell_format(cell.style_id);
        }
    }
});
