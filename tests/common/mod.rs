//! Fixture workbooks built in memory with rust_xlsxwriter

#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

/// One fixture cell
#[derive(Debug, Clone, Copy)]
pub enum Cell {
    S(&'static str),
    N(f64),
    B(bool),
    /// Calendar date stored as a real Excel date
    D(u16, u8, u8),
    E,
}

pub type Rows = Vec<Vec<Cell>>;

/// Build an .xlsx document with the given sheets, in order
pub fn workbook(sheets: &[(&str, Rows)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match *cell {
                    Cell::S(s) => {
                        worksheet.write_string(r, c, s).unwrap();
                    }
                    Cell::N(n) => {
                        worksheet.write_number(r, c, n).unwrap();
                    }
                    Cell::B(b) => {
                        worksheet.write_boolean(r, c, b).unwrap();
                    }
                    Cell::D(y, m, d) => {
                        let date = ExcelDateTime::from_ymd(y, m, d).unwrap();
                        worksheet
                            .write_datetime_with_format(r, c, &date, &date_format)
                            .unwrap();
                    }
                    Cell::E => {}
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// Instruction workbook used across the integration tests
pub fn instruction_sheets() -> Vec<(&'static str, Rows)> {
    use Cell::*;
    vec![
        (
            "columns",
            vec![
                vec![
                    S("source_name"),
                    S("target_name"),
                    S("action"),
                    S("value"),
                    S("is_date"),
                    S("date_format"),
                    S("date_locale"),
                ],
                vec![S("Вагон"), S("Номер вагона"), S("copy")],
                vec![S("статус "), S("Статус")],
                vec![S("Дата"), S("Дата"), S("copy"), E, S("да"), S("DD MMM YYYY"), S("ru")],
                vec![S("проект"), S("проект"), S("create")],
                vec![S("Заявка"), S("Заявка"), S("create")],
                vec![S("Экспедитор"), S("Экспедитор"), S("create"), S("ООО Ромашка")],
                vec![S("Станция"), S("Станция")],
            ],
        ),
        (
            "replace",
            vec![
                vec![S("column"), S("find"), S("replace"), S("project"), S("project2")],
                vec![S("Статус"), S("FAIL"), S("Ошибка"), S("P1"), S("З-100")],
                vec![S("Номер вагона"), N(102.0), S("102-Б")],
                vec![S("Статус"), S("UNKNOWN"), S("?")],
            ],
        ),
        (
            "email",
            vec![
                vec![S("parameter"), S("value")],
                vec![S("subject"), S("Дислокация: {output_filename}")],
                vec![
                    S("body_template"),
                    S("Файл {source_filename}: {processed_rows} строк.\n{custom_content}\n--\n{footer_text}"),
                ],
                vec![S("footer_text"), S("Отдел логистики")],
                vec![S("variables"), S("source_filename, processed_rows")],
            ],
        ),
        (
            "formatting",
            vec![
                vec![S("parameter"), S("value")],
                vec![S("font_name"), S("Arial")],
                vec![S("font_size"), N(11.0)],
                vec![S("header_background_color"), S("#1f4e79")],
                vec![S("header_text_color"), S("FFFFFF")],
                vec![S("cell_background_color"), S("FFFFFF")],
            ],
        ),
    ]
}

pub fn instruction_workbook() -> Vec<u8> {
    workbook(&instruction_sheets())
}

/// Data workbook: three wagons, one failed status, mixed cell types
pub fn data_sheets() -> Vec<(&'static str, Rows)> {
    use Cell::*;
    vec![
        (
            "Лист1",
            vec![
                vec![S("Вагон"), S("Статус"), S("Дата"), S("Груз"), S("Порожний")],
                vec![N(101.0), S("OK"), D(2025, 3, 7), S("уголь"), B(false)],
                vec![N(102.0), S("FAIL"), S("15.04.2025"), S("руда"), B(true)],
                vec![N(103.0), S("OK"), S("нет данных"), E, B(false)],
            ],
        ),
        ("Справка", vec![vec![S("ignored")]]),
    ]
}

pub fn data_workbook() -> Vec<u8> {
    workbook(&data_sheets())
}
