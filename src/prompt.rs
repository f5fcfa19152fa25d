pub const FALLBACK_QUESTION: &str = "What is IBM?";

pub const CAPITAL_OF_FRANCE_REQUEST: &str = "Write a paragraph about the capital of France.";

// Trailing spaces are significant.
pub const SAMPLE_COMPLAINT: &str = concat!(
    "\n",
    "            I just tried to book a flight on your incredibly slow website.  All\x20\n",
    "            the times and prices were confusing.  I liked being able to compare\x20\n",
    "            the amenities in economy with business class side by side.  But I\x20\n",
    "            never got to reserve a seat because I didn't understand the seat map.\x20\x20\n",
    "            Next time, I'll use a travel agent!\n",
    "            ",
);

const INSTRUCTION: &str = "Answer this question briefly.";
const EXAMPLES: &str = "\n\nQuestion: What is the capital of Germany\nAnswer: Berlin\n\n\
Question: What year was George Washington born?\nAnswer: 1732\n\n\
Question: What are the main micro nutrients in food?\nAnswer: Protein, carbohydrates, and fat\n\n\
Question: What language is spoken in Brazil?\nAnswer: Portuguese \n\n\
Question: ";
const END_PROMPT: &str = "Answer:";

/// Few-shot prompt around `question`. The question is spliced in verbatim.
pub fn build_prompt(question: &str) -> String {
    let mut prompt =
        String::with_capacity(INSTRUCTION.len() + EXAMPLES.len() + question.len() + END_PROMPT.len());
    prompt.push_str(INSTRUCTION);
    prompt.push_str(EXAMPLES);
    prompt.push_str(question);
    prompt.push_str(END_PROMPT);
    prompt
}

pub fn question_or_fallback(input: &str) -> &str {
    if input.trim().is_empty() {
        FALLBACK_QUESTION
    } else {
        input
    }
}

pub fn complaint_prompt(complaint: &str) -> String {
    format!(
        concat!(
            "\n",
            "    From the following customer complaint, extract 3 factors that caused the customer to be unhappy.\x20\n",
            "    Put each factor on a new line.\x20\n",
            "\n",
            "    Customer complaint:{complaint}\n",
            "\n",
            "    Numbered list of all the factors that caused the customer to be unhappy:\n",
            "    ",
        ),
        complaint = complaint
    )
}
