//! Printable and exportable reports: one session, or a whole month.

use std::fmt::Write as _;

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::{
    Bill, EngineError, MoneyCents, MonthYear, ResultEngine, Session, SessionDetail,
    aggregator::{self, GlobalStats},
};

const SESSION_HEADER: [&str; 5] = ["name", "quantity", "unit_price", "line_total", "kind"];
const MONTHLY_HEADER: [&str; 9] = [
    "tipo",
    "data",
    "descricao",
    "total",
    "compartilhado",
    "pessoal",
    "pessoas",
    "minha_parte",
    "status",
];

/// CSV writer whose header is written up front, so an export without rows
/// still carries it.
fn csv_writer(header: &[&str]) -> ResultEngine<Writer<Vec<u8>>> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    writer.write_record(header).map_err(export_error)?;
    Ok(writer)
}

fn export_error(err: impl std::fmt::Display) -> EngineError {
    EngineError::Export(err.to_string())
}

fn slug(value: &str) -> String {
    let slug: String = crate::util::search_key(value)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    slug.split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Report of one session: header, line items and the split summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    detail: SessionDetail,
}

#[derive(Serialize)]
struct ExportRow<'a> {
    name: &'a str,
    quantity: i32,
    unit_price: String,
    line_total: String,
    kind: &'static str,
}

fn kind_label(is_personal: bool) -> &'static str {
    if is_personal { "pessoal" } else { "compartilhado" }
}

impl SessionReport {
    pub fn new(detail: SessionDetail) -> Self {
        Self { detail }
    }

    pub fn detail(&self) -> &SessionDetail {
        &self.detail
    }

    /// Suggested file name for downloads, e.g. `feira-de-sabado.csv`.
    pub fn file_name(&self, extension: &str) -> String {
        let slug = slug(&self.detail.session.title);
        if slug.is_empty() {
            format!("sessao.{extension}")
        } else {
            format!("{slug}.{extension}")
        }
    }

    /// Plain text rendering for printing.
    pub fn render_text(&self) -> String {
        let SessionDetail {
            session,
            items,
            totals,
        } = &self.detail;
        let status = if session.is_finalized {
            "finalizada"
        } else {
            "aberta"
        };

        // Writing into a String cannot fail.
        let mut out = String::new();
        let _ = writeln!(out, "Relatório de compra: {}", session.title);
        let _ = writeln!(out, "Data: {}", session.created_at.format("%d/%m/%Y"));
        let _ = writeln!(out, "Pessoas: {}", totals.split_count);
        let _ = writeln!(out, "Status: {status}");
        let _ = writeln!(out);

        if items.is_empty() {
            let _ = writeln!(out, "Nenhum item registrado.");
        } else {
            let _ = writeln!(out, "Itens:");
            for item in items {
                let _ = writeln!(
                    out,
                    "  {}x {} - {} ({})",
                    item.quantity,
                    item.name,
                    item.line_total(),
                    kind_label(item.is_personal)
                );
            }
        }
        let _ = writeln!(out);

        let _ = writeln!(out, "Compartilhado: {}", totals.shared);
        let _ = writeln!(out, "Pessoal: {}", totals.personal);
        let _ = writeln!(out, "Parte de cada um: {}", totals.friend_share);
        let _ = writeln!(out, "Minha parte: {}", totals.user_total);
        out
    }

    /// CSV with one row per item; amounts use `.` as decimal separator.
    pub fn to_csv(&self) -> ResultEngine<Vec<u8>> {
        let mut writer = csv_writer(&SESSION_HEADER)?;
        for item in &self.detail.items {
            writer
                .serialize(ExportRow {
                    name: &item.name,
                    quantity: item.quantity,
                    unit_price: item.price.to_decimal_string(),
                    line_total: item.line_total().to_decimal_string(),
                    kind: kind_label(item.is_personal),
                })
                .map_err(export_error)?;
        }
        writer.into_inner().map_err(export_error)
    }
}

/// Monthly expense report: the general summary, the sessions created in the
/// month and the month's fixed bills.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthlyReport {
    pub month: MonthYear,
    /// Over every open session and the unpaid bills of the month.
    pub stats: GlobalStats,
    /// Sessions created in the month, newest first.
    pub sessions: Vec<Session>,
    /// Bills of the month by due day.
    pub bills: Vec<Bill>,
}

#[derive(Serialize)]
struct MonthlyRow<'a> {
    kind: &'static str,
    date: Option<String>,
    title: &'a str,
    total: String,
    shared: Option<String>,
    personal: Option<String>,
    split_count: i32,
    user_part: String,
    status: &'static str,
}

/// `personal + shared / split`: what the user spent in a session.
fn session_user_part(session: &Session) -> MoneyCents {
    session.total_personal_cost + session.total_shared_cost.split(session.split_count)
}

fn session_status(session: &Session) -> &'static str {
    if session.is_finalized { "finalizada" } else { "aberta" }
}

fn bill_status(bill: &Bill) -> &'static str {
    if bill.is_paid { "Paga" } else { "Em aberto" }
}

impl MonthlyReport {
    /// Builds the report from all the user's sessions (newest first) and the
    /// bills of `month`.
    pub fn assemble(month: MonthYear, sessions: Vec<Session>, bills: Vec<Bill>) -> Self {
        let stats = aggregator::global_stats(&sessions, None, &bills);
        let sessions = sessions
            .into_iter()
            .filter(|s| month.contains(s.created_at))
            .collect();
        Self {
            month,
            stats,
            sessions,
            bills,
        }
    }

    /// The user's part of market spending: personal plus own shared share.
    pub fn market_user_part(&self) -> MoneyCents {
        self.stats.total_personal + self.stats.total_shared - self.stats.total_gained
    }

    /// e.g. `relatorio-10-2026.csv`.
    pub fn file_name(&self, extension: &str) -> String {
        format!(
            "relatorio-{}-{}.{extension}",
            self.month.month(),
            self.month.year()
        )
    }

    pub fn render_text(&self) -> String {
        let stats = &self.stats;

        // Writing into a String cannot fail.
        let mut out = String::new();
        let _ = writeln!(out, "Relatório de Despesas - {}", self.month.label());
        let _ = writeln!(out);
        let _ = writeln!(out, "Resumo Geral");
        let _ = writeln!(out, "  Gasto Compartilhado: {}", stats.total_shared);
        let _ = writeln!(out, "  Minha Parte Total (mercado): {}", self.market_user_part());
        let _ = writeln!(out, "  A Receber / Outros: {}", stats.total_gained);
        let _ = writeln!(out, "  Total Contas da Casa em Aberto: {}", stats.unpaid_total);
        let _ = writeln!(out, "  Minha Parte nas Contas: {}", stats.unpaid_user_part);

        if !self.sessions.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Compras do Mês (Sessões)");
            for session in &self.sessions {
                let _ = writeln!(
                    out,
                    "  {} | {} | Total {} | Compartilhado {} | Pessoal {} | Pessoas {} | Minha Parte {}",
                    session.created_at.format("%d/%m/%Y"),
                    session.title,
                    session.grand_total(),
                    session.total_shared_cost,
                    session.total_personal_cost,
                    session.split_count,
                    session_user_part(session)
                );
            }
        }

        if !self.bills.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Contas Fixas do Mês");
            for bill in &self.bills {
                let _ = writeln!(
                    out,
                    "  {} | Valor {} | Pessoas {} | Minha Parte {} | {}",
                    bill.title,
                    bill.amount,
                    bill.split_count,
                    bill.user_part(),
                    bill_status(bill)
                );
            }
        }
        out
    }

    /// CSV with one row per session (`sessao`) and per bill (`conta`).
    pub fn to_csv(&self) -> ResultEngine<Vec<u8>> {
        let mut writer = csv_writer(&MONTHLY_HEADER)?;
        for session in &self.sessions {
            writer
                .serialize(MonthlyRow {
                    kind: "sessao",
                    date: Some(session.created_at.format("%d/%m/%Y").to_string()),
                    title: &session.title,
                    total: session.grand_total().to_decimal_string(),
                    shared: Some(session.total_shared_cost.to_decimal_string()),
                    personal: Some(session.total_personal_cost.to_decimal_string()),
                    split_count: session.split_count.get(),
                    user_part: session_user_part(session).to_decimal_string(),
                    status: session_status(session),
                })
                .map_err(export_error)?;
        }
        for bill in &self.bills {
            writer
                .serialize(MonthlyRow {
                    kind: "conta",
                    date: None,
                    title: &bill.title,
                    total: bill.amount.to_decimal_string(),
                    shared: None,
                    personal: None,
                    split_count: bill.split_count.get(),
                    user_part: bill.user_part().to_decimal_string(),
                    status: bill_status(bill),
                })
                .map_err(export_error)?;
        }
        writer.into_inner().map_err(export_error)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Item, MoneyCents, Session, SplitCount};

    fn report() -> SessionReport {
        let session = Session::new("alice", "Feirão de Sábado".to_string(), SplitCount::new(2));
        let items = vec![
            Item::new(session.id, "Arroz".to_string(), MoneyCents::new(10_00), 2, false),
            Item::new(session.id, "Café, moído".to_string(), MoneyCents::new(5_00), 1, true),
        ];
        SessionReport::new(SessionDetail::new(session, items))
    }

    #[test]
    fn text_contains_summary() {
        let text = report().render_text();

        assert!(text.contains("Relatório de compra: Feirão de Sábado"));
        assert!(text.contains("2x Arroz - R$ 20,00 (compartilhado)"));
        assert!(text.contains("Parte de cada um: R$ 10,00"));
        assert!(text.contains("Minha parte: R$ 15,00"));
    }

    #[test]
    fn csv_has_header_and_quoted_rows() {
        let csv = String::from_utf8(report().to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "name,quantity,unit_price,line_total,kind");
        assert_eq!(lines[1], "Arroz,2,10.00,20.00,compartilhado");
        assert_eq!(lines[2], "\"Café, moído\",1,5.00,5.00,pessoal");

        let empty = Session::new("alice", "Vazia".to_string(), SplitCount::default());
        let report = SessionReport::new(SessionDetail::new(empty, Vec::new()));
        let csv = String::from_utf8(report.to_csv().unwrap()).unwrap();
        assert_eq!(csv, "name,quantity,unit_price,line_total,kind\n");
    }

    #[test]
    fn file_name_is_slugged() {
        assert_eq!(report().file_name("csv"), "feirao-de-sabado.csv");

        let empty = Session::new("alice", "!!!".to_string(), SplitCount::default());
        let report = SessionReport::new(SessionDetail::new(empty, Vec::new()));
        assert_eq!(report.file_name("txt"), "sessao.txt");
        assert!(report.render_text().contains("Nenhum item registrado."));
    }

    fn month() -> MonthYear {
        MonthYear::new(10, 2026).unwrap()
    }

    fn session_at(title: &str, created_at: &str, shared: i64, personal: i64) -> Session {
        let mut session = Session::new("alice", title.to_string(), SplitCount::new(2));
        session.created_at = created_at.parse().unwrap();
        session.total_shared_cost = MoneyCents::new(shared);
        session.total_personal_cost = MoneyCents::new(personal);
        session
    }

    fn bill(title: &str, amount: i64, is_paid: bool) -> Bill {
        Bill {
            id: uuid::Uuid::new_v4(),
            user_id: "alice".to_string(),
            title: title.to_string(),
            amount: MoneyCents::new(amount),
            due_day: 10,
            split_count: SplitCount::new(2),
            month_year: month(),
            is_paid,
            created_at: "2026-10-01T12:00:00Z".parse().unwrap(),
        }
    }

    fn monthly() -> MonthlyReport {
        let sessions = vec![
            session_at("Feira", "2026-10-12T15:00:00Z", 40_00, 5_00),
            session_at("Atacado", "2026-09-28T15:00:00Z", 20_00, 0),
        ];
        let bills = vec![bill("Aluguel", 1000_00, false), bill("Internet", 100_00, true)];
        MonthlyReport::assemble(month(), sessions, bills)
    }

    #[test]
    fn monthly_keeps_sessions_of_the_month_and_sums_open_ones() {
        let report = monthly();

        assert_eq!(report.sessions.len(), 1);
        assert_eq!(report.sessions[0].title, "Feira");
        // Open sessions from other months still count in the summary.
        assert_eq!(report.stats.total_shared, MoneyCents::new(60_00));
        assert_eq!(report.stats.total_gained, MoneyCents::new(30_00));
        assert_eq!(report.market_user_part(), MoneyCents::new(35_00));
        assert_eq!(report.stats.unpaid_total, MoneyCents::new(1000_00));
        assert_eq!(report.stats.unpaid_user_part, MoneyCents::new(500_00));
    }

    #[test]
    fn monthly_text_lists_sections() {
        let text = monthly().render_text();

        assert!(text.starts_with("Relatório de Despesas - outubro de 2026"));
        assert!(text.contains("Minha Parte Total (mercado): R$ 35,00"));
        assert!(text.contains("12/10/2026 | Feira | Total R$ 45,00"));
        assert!(text.contains("Minha Parte R$ 25,00"));
        assert!(text.contains("Aluguel | Valor R$ 1000,00 | Pessoas 2 | Minha Parte R$ 500,00 | Em aberto"));
        assert!(text.contains("Internet"));
        assert!(!text.contains("Atacado"));

        let empty = MonthlyReport::assemble(month(), Vec::new(), Vec::new());
        let text = empty.render_text();
        assert!(!text.contains("Compras do Mês"));
        assert!(!text.contains("Contas Fixas do Mês"));
    }

    #[test]
    fn monthly_csv_has_one_row_per_entry() {
        let csv = String::from_utf8(monthly().to_csv().unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "tipo,data,descricao,total,compartilhado,pessoal,pessoas,minha_parte,status",
                "sessao,12/10/2026,Feira,45.00,40.00,5.00,2,25.00,aberta",
                "conta,,Aluguel,1000.00,,,2,500.00,Em aberto",
                "conta,,Internet,100.00,,,2,50.00,Paga",
            ]
        );
        assert_eq!(monthly().file_name("csv"), "relatorio-10-2026.csv");

        let empty = MonthlyReport::assemble(month(), Vec::new(), Vec::new());
        let csv = String::from_utf8(empty.to_csv().unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
