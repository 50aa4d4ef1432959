use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Widget},
};

use crate::{
    app::App,
    catalog::{is_due_soon, QuizFilter},
    format::{format_average, format_due},
    quiz::QuizStatus,
};

/// Overview of the catalog: filter tabs, search, the quiz table and totals
pub struct QuizList<'a>(pub &'a App);

impl Widget for QuizList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let app = self.0;
        let query = &app.list.query;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // tabs
                Constraint::Length(3), // search
                Constraint::Min(4),    // table
                Constraint::Length(3), // stats
                Constraint::Length(1), // notice / help
            ])
            .split(area);

        let selected_tab = match query.filter {
            QuizFilter::All => 0,
            QuizFilter::Upcoming => 1,
            QuizFilter::Completed => 2,
        };
        Tabs::new(vec!["All Quizzes", "Upcoming", "Completed"])
            .select(selected_tab)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(
                        "Quizzes for {} ({})",
                        app.viewer.user.full_name,
                        app.viewer.role()
                    )),
            )
            .render(chunks[0], buf);

        let search_style = if app.list.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Paragraph::new(Span::styled(query.search.clone(), search_style))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("Search by title or course (sort: {})", query.sort_by)),
            )
            .render(chunks[1], buf);

        let authoring = app.viewer.can_author_quizzes();
        let now = Local::now().naive_local();
        let rows: Vec<Row> = app
            .visible_quizzes()
            .iter()
            .enumerate()
            .map(|(i, quiz)| {
                let due = match quiz.due_date {
                    Some(d) if is_due_soon(d, now) => {
                        Cell::from(format!("{} (due soon)", format_due(d)))
                            .style(Style::default().fg(Color::Red))
                    }
                    Some(d) => Cell::from(format_due(d)),
                    None => Cell::from("-"),
                };
                let status = match (quiz.status, quiz.score) {
                    (QuizStatus::Completed, Some(score)) => {
                        Cell::from(format!("score {score}%")).style(Style::default().fg(Color::Green))
                    }
                    (status, _) => Cell::from(status.to_string()),
                };
                let limit = quiz
                    .time_limit
                    .map_or_else(|| "30 min".to_string(), |m| format!("{m} min"));

                let mut cells = vec![
                    Cell::from(quiz.title.clone()),
                    Cell::from(quiz.course.clone()),
                    due,
                    Cell::from(limit),
                    Cell::from(quiz.question_count().to_string()),
                ];
                if authoring {
                    cells.push(Cell::from(
                        quiz.passing_score.map_or_else(|| "-".to_string(), |p| format!("{p}%")),
                    ));
                }
                cells.push(status);
                let row = Row::new(cells);
                if i == app.list.selected {
                    row.style(Style::default().bg(Color::DarkGray))
                } else {
                    row
                }
            })
            .collect();

        let mut titles = vec!["Title", "Course", "Due", "Limit", "Qs"];
        let mut widths = vec![
            Constraint::Percentage(28),
            Constraint::Percentage(24),
            Constraint::Percentage(24),
            Constraint::Length(7),
            Constraint::Length(4),
        ];
        if authoring {
            titles.push("Pass");
            widths.push(Constraint::Length(5));
        }
        titles.push("Status");
        widths.push(Constraint::Min(10));

        let header = Row::new(titles).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

        Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL))
        .render(chunks[2], buf);

        let stats = app.stats();
        Paragraph::new(Line::from(vec![
            Span::raw(format!("Total {}   ", stats.total)),
            Span::raw(format!("Completed {}   ", stats.completed)),
            Span::raw(format!("Upcoming {}   ", stats.upcoming)),
            Span::styled(
                format!("Average {}", format_average(stats.average_score)),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Statistics"))
        .render(chunks[3], buf);

        let footer = match &app.notice {
            Some(notice) => Span::styled(notice.clone(), Style::default().fg(Color::Red)),
            None => {
                let mut help =
                    "(↑/↓) select  (enter) open  (tab) filter  (o) sort  (/) search  (q)uit"
                        .to_string();
                // admins see attempts by every user
                if app.viewer.is_admin() {
                    help.push_str(&format!("   {} attempts", app.attempts().records().len()));
                }
                Span::styled(
                    help,
                    Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
                )
            }
        };
        Paragraph::new(footer)
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
    }
}
