pub mod quiz_list;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState, Dialog},
    attempt::QuizResult,
    format::{format_remaining, progress_percent},
    session::{QuizSession, SubmitReason},
};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::List => quiz_list::QuizList(self).render(area, buf),
            AppState::Taking => {
                if let Some(session) = self.session() {
                    render_session(session, area, buf);
                }
                match self.dialog {
                    Some(Dialog::ConfirmSubmit) => {
                        let (answered, total) = self
                            .session()
                            .map(|s| (s.answers().len(), s.quiz().question_count()))
                            .unwrap_or_default();
                        render_dialog(
                            "Submit Quiz?",
                            &[
                                "You won't be able to change your answers after submission.".into(),
                                String::new(),
                                format!("Questions answered: {answered} of {total}"),
                                String::new(),
                                "(y) Submit   (n) Cancel".into(),
                            ],
                            Color::Yellow,
                            area,
                            buf,
                        );
                    }
                    Some(Dialog::TimeWarning) => render_dialog(
                        "Time is running out!",
                        &[
                            format!(
                                "You have {} remaining to complete this quiz.",
                                format_remaining(
                                    self.session().map(|s| s.remaining_secs()).unwrap_or(0)
                                )
                            ),
                            String::new(),
                            "Press any key to continue".into(),
                        ],
                        Color::Red,
                        area,
                        buf,
                    ),
                    None => {}
                }
            }
            AppState::Results => {
                if let Some(result) = &self.result {
                    render_results(result, area, buf);
                }
            }
        }
    }
}

fn render_session(session: &QuizSession, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let quiz = session.quiz();
    let total = quiz.question_count();
    let index = session.current_index();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title + timer
            Constraint::Length(1), // progress
            Constraint::Min(6),    // question card
            Constraint::Length(3), // navigator
            Constraint::Length(1), // help
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(24)])
        .split(chunks[0]);

    Paragraph::new(vec![
        Line::from(Span::styled(quiz.title.clone(), bold_style)),
        Line::from(Span::styled(quiz.course.clone(), dim_style)),
    ])
    .render(header[0], buf);

    let remaining = session.remaining_secs();
    let timer_color = if session.is_low_on_time() {
        Color::Red
    } else {
        Color::Reset
    };
    Paragraph::new(Span::styled(
        format!("Time Remaining: {}", format_remaining(remaining)),
        bold_style.fg(timer_color),
    ))
    .alignment(Alignment::Right)
    .render(header[1], buf);

    let percent = progress_percent(index, total);
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(percent)
        .label(format!("{percent}% Complete"))
        .render(chunks[1], buf);

    let card_title = if total == 0 {
        "No questions".to_string()
    } else {
        format!("Question {} of {}", index + 1, total)
    };
    let card = Block::default().borders(Borders::ALL).title(card_title);

    let body = match session.current_question() {
        Some(question) => {
            let selected = session.selected(&question.id);
            let mut lines = vec![
                Line::from(Span::styled(question.prompt.clone(), bold_style)),
                Line::default(),
            ];
            lines.extend(question.options.iter().enumerate().map(|(i, option)| {
                let is_selected = selected == Some(i);
                let marker = if is_selected { "(•)" } else { "( )" };
                let style = if is_selected {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!("{marker} {}. {option}", i + 1), style))
            }));
            lines
        }
        None => vec![Line::from("No questions available for this quiz.")],
    };

    Paragraph::new(body)
        .block(card)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    let navigator: Vec<Span> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| {
            let style = if i == index {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else if session.selected(&q.id).is_some() {
                Style::default().fg(Color::Green)
            } else {
                dim_style
            };
            Span::styled(format!(" {} ", i + 1), style)
        })
        .collect();

    Paragraph::new(Line::from(navigator))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Question Navigator"),
        )
        .render(chunks[3], buf);

    let next_hint = if session.is_last_question() {
        "(enter) submit"
    } else {
        "(enter) next"
    };
    Paragraph::new(Span::styled(
        format!("(1-9) answer  (←/→) prev/next  (u) unanswered  (s) submit  {next_hint}  (esc) leave"),
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);
}

fn render_results(result: &QuizResult, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2), // title
            Constraint::Length(1), // padding
            Constraint::Length(1), // score gauge
            Constraint::Length(1), // padding
            Constraint::Length(3), // counts
            Constraint::Min(3),    // feedback
            Constraint::Length(1), // help
        ])
        .split(area);

    let status = match (result.reason, result.passed) {
        (Some(SubmitReason::TimedOut), _) => "Completed (time ran out)",
        (_, Some(true)) => "Completed (passed)",
        (_, Some(false)) => "Completed (not passed)",
        _ => "Completed",
    };

    Paragraph::new(vec![
        Line::from(Span::styled(result.title.clone(), bold_style)),
        Line::from(vec![
            Span::styled(result.course.clone(), Style::default().add_modifier(Modifier::DIM)),
            Span::raw("  "),
            Span::styled(status, Style::default().fg(Color::Green)),
        ]),
    ])
    .render(chunks[0], buf);

    let score_color = if result.score >= 70 {
        Color::Green
    } else {
        Color::Yellow
    };
    Gauge::default()
        .gauge_style(Style::default().fg(score_color))
        .percent(result.score.min(100) as u16)
        .label(format!("Score: {}%", result.score))
        .render(chunks[2], buf);

    let counts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[4]);

    for (rect, (label, value)) in counts.iter().zip([
        ("Total Questions", result.total),
        ("Correct Answers", result.correct),
        ("Incorrect Answers", result.incorrect()),
    ]) {
        Paragraph::new(Span::styled(value.to_string(), bold_style))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(label))
            .render(*rect, buf);
    }

    Paragraph::new(result.feedback.message())
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Feedback"))
        .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        "(b)ack to quizzes",
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[6], buf);
}

fn render_dialog(title: &str, lines: &[String], accent: Color, area: Rect, buf: &mut Buffer) {
    let width = area.width.min(70);
    let height = (lines.len() as u16 + 2).min(area.height);
    let rect = centered(area, width, height);

    Clear.render(rect, buf);
    Paragraph::new(lines.iter().map(|l| Line::from(l.as_str())).collect::<Vec<_>>())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent))
                .title(Span::styled(
                    title.to_string(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
        )
        .render(rect, buf);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    }
}
