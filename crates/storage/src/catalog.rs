//! Built-in demo catalog: six web-development lessons, each with a short
//! three-question quiz. Used by the seed binary and by tests that want a
//! realistic content set without a database.

use lesson_core::error::Error;
use lesson_core::model::{
    Lesson, LessonContent, LessonId, LessonLevel, Question, QuestionId, QuizDefinition,
};

fn lesson(
    id: u64,
    title: &str,
    description: &str,
    duration_minutes: u32,
    level: LessonLevel,
    introduction: &str,
    topics: &[&str],
    examples: &[&str],
    conclusion: &str,
) -> Result<Lesson, Error> {
    let content = LessonContent {
        introduction: introduction.to_string(),
        topics: topics.iter().map(ToString::to_string).collect(),
        examples: examples.iter().map(ToString::to_string).collect(),
        conclusion: conclusion.to_string(),
    };
    Ok(Lesson::new(
        LessonId::new(id),
        title,
        description,
        duration_minutes,
        level,
        content,
    )?)
}

fn question(
    id: u32,
    prompt: &str,
    options: [&str; 4],
    correct: usize,
    explanation: &str,
) -> Result<Question, Error> {
    Ok(Question::new(
        QuestionId::new(id),
        prompt,
        options.iter().map(ToString::to_string).collect(),
        correct,
        explanation,
    )?)
}

fn quiz(
    lesson_id: u64,
    lesson_title: &str,
    questions: Vec<Result<Question, Error>>,
) -> Result<QuizDefinition, Error> {
    let questions = questions.into_iter().collect::<Result<Vec<_>, _>>()?;
    Ok(QuizDefinition::new(
        LessonId::new(lesson_id),
        lesson_title,
        questions,
    )?)
}

/// The six demo lessons, in catalog order.
///
/// # Errors
///
/// Returns a validation error if the built-in data is inconsistent.
pub fn demo_lessons() -> Result<Vec<Lesson>, Error> {
    [
        lesson(
            1,
            "Getting Started with Next.js",
            "Core concepts and project setup",
            30,
            LessonLevel::Beginner,
            "Next.js is a modern web framework built on React. It offers \
             server-side rendering, static site generation and much more.",
            &[
                "What is Next.js and why use it?",
                "Creating a project with create-next-app",
                "Understanding the project structure",
                "Running the development server",
                "Building your first page",
            ],
            &[
                "Starting a project with create-next-app",
                "A simple 'Hello World' page",
                "Trying out hot reload",
            ],
            "Building modern web applications with Next.js is fast and approachable.",
        ),
        lesson(
            2,
            "React Components",
            "Component structure and props",
            45,
            LessonLevel::Beginner,
            "React components split the user interface into small, reusable pieces.",
            &["Function components", "Props", "Component composition"],
            &["A Button component", "A Card component"],
            "Components are the heart of React.",
        ),
        lesson(
            3,
            "Routing & Navigation",
            "The app router and dynamic routes",
            40,
            LessonLevel::Intermediate,
            "The app router provides file-system based routing.",
            &["The app router", "Dynamic routes", "The Link component"],
            &["A static route", "A dynamic route", "Nested routes"],
            "The routing system is simple and powerful.",
        ),
        lesson(
            4,
            "Data Fetching",
            "Server and client components, using APIs",
            50,
            LessonLevel::Intermediate,
            "Data can be fetched on the server or in the browser, and each \
             approach has its place.",
            &["Server components", "Client components", "The fetch API"],
            &["Fetching in a server component", "Fetching with an effect hook"],
            "Choosing the right data fetching strategy keeps pages fast.",
        ),
        lesson(
            5,
            "Styling with Tailwind",
            "Modern design with utility classes",
            35,
            LessonLevel::Beginner,
            "Tailwind CSS is a utility-first CSS framework.",
            &["What is Tailwind?", "Utility classes", "Responsive design"],
            &["A gradient background", "A responsive grid", "Hover effects"],
            "Styling with utilities is quick and consistent.",
        ),
        lesson(
            6,
            "State Management",
            "Local state, effects and context",
            60,
            LessonLevel::Advanced,
            "State management is critical in interactive applications.",
            &["useState", "useEffect", "The context API", "Custom hooks"],
            &["A counter", "A todo list", "A theme provider"],
            "Good state management keeps an application scalable.",
        ),
    ]
    .into_iter()
    .collect()
}

/// One three-question quiz per demo lesson.
///
/// # Errors
///
/// Returns a validation error if the built-in data is inconsistent.
pub fn demo_quizzes() -> Result<Vec<QuizDefinition>, Error> {
    [
        quiz(
            1,
            "Getting Started with Next.js",
            vec![
                question(
                    1,
                    "What is Next.js?",
                    [
                        "A CSS framework",
                        "A React-based web framework",
                        "A database system",
                        "A programming language",
                    ],
                    1,
                    "Next.js is a modern web framework built on React, offering \
                     server-side rendering and static site generation.",
                ),
                question(
                    2,
                    "How are pages created in Next.js?",
                    [
                        "They are declared in a config file",
                        "Through file-system based routing",
                        "By registering routes manually",
                        "By writing plain HTML files",
                    ],
                    1,
                    "Each folder under app/ automatically becomes a route.",
                ),
                question(
                    3,
                    "What does the create-next-app command do?",
                    [
                        "Updates an existing project",
                        "Creates a new Next.js project",
                        "Deploys the project to production",
                        "Sets up a database connection",
                    ],
                    1,
                    "create-next-app is the official CLI tool for starting a new project.",
                ),
            ],
        ),
        quiz(
            2,
            "React Components",
            vec![
                question(
                    1,
                    "What is a component in React?",
                    [
                        "A CSS class",
                        "A reusable piece of the user interface",
                        "A database table",
                        "An HTTP request",
                    ],
                    1,
                    "Components break the interface into small, reusable pieces.",
                ),
                question(
                    2,
                    "What are props for?",
                    [
                        "Changing state",
                        "Passing data between components",
                        "Defining CSS styles",
                        "Making API calls",
                    ],
                    1,
                    "Props pass data from a parent component to a child component.",
                ),
                question(
                    3,
                    "How is a function component defined?",
                    [
                        "class Component extends React.Component",
                        "function Component() { return ... }",
                        "const Component = new React.Component()",
                        "Component.create()",
                    ],
                    1,
                    "Modern React prefers function components that return JSX.",
                ),
            ],
        ),
        quiz(
            3,
            "Routing & Navigation",
            vec![
                question(
                    1,
                    "What does a folder named [id] mean?",
                    [
                        "A static route",
                        "A dynamic route parameter",
                        "A hidden folder",
                        "A special component",
                    ],
                    1,
                    "Square-bracket names stand for dynamic route parameters.",
                ),
                question(
                    2,
                    "Which component is used for client-side navigation?",
                    ["a", "Link", "Route", "Navigate"],
                    1,
                    "The Link component navigates between pages without a full reload.",
                ),
                question(
                    3,
                    "Where do nested routes come from?",
                    [
                        "A routes configuration file",
                        "Nested folders under app/",
                        "Query parameters",
                        "The middleware",
                    ],
                    1,
                    "Nesting folders under app/ nests the corresponding routes.",
                ),
            ],
        ),
        quiz(
            4,
            "Data Fetching",
            vec![
                question(
                    1,
                    "Where do server components run?",
                    ["In the browser", "On the server", "In a web worker", "In the database"],
                    1,
                    "Server components render on the server and send HTML to the client.",
                ),
                question(
                    2,
                    "Which directive marks a client component?",
                    ["\"use strict\"", "\"use client\"", "\"use browser\"", "\"use effect\""],
                    1,
                    "Files starting with \"use client\" opt into running in the browser.",
                ),
                question(
                    3,
                    "What is the fetch API used for?",
                    [
                        "Styling elements",
                        "Routing between pages",
                        "Making HTTP requests",
                        "Managing state",
                    ],
                    2,
                    "fetch performs HTTP requests from both server and client code.",
                ),
            ],
        ),
        quiz(
            5,
            "Styling with Tailwind",
            vec![
                question(
                    1,
                    "What kind of framework is Tailwind CSS?",
                    [
                        "A component library",
                        "A utility-first CSS framework",
                        "A JavaScript bundler",
                        "A testing framework",
                    ],
                    1,
                    "Tailwind styles elements by composing small utility classes.",
                ),
                question(
                    2,
                    "How is a responsive style written in Tailwind?",
                    [
                        "With a media-query block",
                        "With breakpoint prefixes like md:",
                        "With a separate stylesheet per device",
                        "With inline style attributes",
                    ],
                    1,
                    "Breakpoint prefixes such as sm: and md: scope utilities to screen sizes.",
                ),
                question(
                    3,
                    "Which class sets a hover style?",
                    ["on-hover:", "hover:", "mouse:", "focus:"],
                    1,
                    "The hover: prefix applies a utility only while the element is hovered.",
                ),
            ],
        ),
        quiz(
            6,
            "State Management",
            vec![
                question(
                    1,
                    "What does useState return?",
                    [
                        "Only the current value",
                        "The current value and an update function",
                        "A promise of the next value",
                        "A reference to the DOM node",
                    ],
                    1,
                    "useState returns a pair: the value and a setter that triggers a re-render.",
                ),
                question(
                    2,
                    "When does a useEffect with an empty dependency array run?",
                    [
                        "On every render",
                        "Only after the first render",
                        "Never",
                        "Only when state changes",
                    ],
                    1,
                    "An empty dependency array limits the effect to the initial mount.",
                ),
                question(
                    3,
                    "What problem does the context API solve?",
                    [
                        "Slow network requests",
                        "Passing data deeply without prop drilling",
                        "Styling conflicts",
                        "Bundle size",
                    ],
                    1,
                    "Context shares values across the tree without threading props through \
                     every level.",
                ),
            ],
        ),
    ]
    .into_iter()
    .collect()
}
