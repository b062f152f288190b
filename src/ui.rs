use crate::habit::{HabitChallenge, CHALLENGE_DAYS};

pub fn render_index(date: &str, entry_count: usize, habit: &HabitChallenge) -> String {
    let habit_line = if habit.data.current_habit.is_empty() {
        "No habit selected yet.".to_string()
    } else {
        format!("Current habit: {}", habit.data.current_habit)
    };
    let entry_label = if entry_count == 1 { "entry" } else { "entries" };
    INDEX_HTML
        .replace("{{DATE}}", date)
        .replace("{{ENTRIES}}", &format!("{entry_count} {entry_label} saved"))
        .replace("{{HABIT}}", &habit_line)
        .replace(
            "{{HABIT_PROGRESS}}",
            &format!("{}/{} days", habit.data.completed_days, CHALLENGE_DAYS),
        )
        .replace("{{HABIT_PERCENT}}", &format!("{:.0}", habit.progress_percent()))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mindspace</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef3f8;
      --bg-2: #cfe3f5;
      --ink: #2b2a28;
      --accent: #667eea;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e5ecf9 60%, #f2f5fb 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.8rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(220px, 1fr));
      gap: 16px;
    }

    .card {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .card .label {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .card .value {
      font-size: 1.4rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    .progress-track {
      height: 10px;
      border-radius: 999px;
      background: rgba(47, 72, 88, 0.1);
      overflow: hidden;
    }

    .progress-fill {
      height: 100%;
      width: {{HABIT_PERCENT}}%;
      border-radius: inherit;
      background: linear-gradient(135deg, var(--accent), #764ba2);
    }

    footer {
      color: #8b857d;
      font-size: 0.85rem;
      text-align: center;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Mindspace</h1>
      <p class="subtitle">Journal for {{DATE}}</p>
    </header>
    <section class="panel">
      <div class="card">
        <span class="label">Journal</span>
        <span class="value">{{ENTRIES}}</span>
      </div>
      <div class="card">
        <span class="label">Habit challenge</span>
        <span class="value">{{HABIT_PROGRESS}}</span>
        <span class="subtitle">{{HABIT}}</span>
        <div class="progress-track"><div class="progress-fill"></div></div>
      </div>
    </section>
    <footer>Everything on this page is served from the /api endpoints.</footer>
  </main>
</body>
</html>
"#;
